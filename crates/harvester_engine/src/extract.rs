use harvest_logging::harvest_warn;
use harvester_core::{ItemUrl, Record};
use serde_json::Value;

use crate::render::{PageHandle, Readiness};
use crate::RenderError;

/// Selector of embedded schema.org blocks.
pub const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The page loaded but carries none of the listing's data.
    #[error("no listing content on page")]
    NoContent,
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Turns a loaded detail page into a [`Record`]. One implementation per site.
pub trait RecordExtractor: Send + Sync {
    /// Short site name for logs.
    fn site(&self) -> &str;

    /// What a detail page must show before extraction starts.
    fn readiness(&self) -> Readiness;

    fn extract(&self, page: &dyn PageHandle, url: &ItemUrl) -> Result<Record, ExtractError>;
}

/// Parsed JSON-LD blocks of a page.
///
/// Arrays and `@graph` containers are flattened so lookups see every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredData {
    nodes: Vec<Value>,
}

impl StructuredData {
    /// Parses each block; malformed blocks are logged and skipped.
    pub fn parse(blocks: &[String]) -> Self {
        let mut nodes = Vec::new();
        for block in blocks {
            match serde_json::from_str::<Value>(block.trim()) {
                Ok(value) => collect_nodes(value, &mut nodes),
                Err(err) => harvest_warn!("Ignoring malformed structured data block: {err}"),
            }
        }
        Self { nodes }
    }

    /// Reads every structured block on `page`.
    pub fn from_page(page: &dyn PageHandle) -> Result<Self, RenderError> {
        Ok(Self::parse(&page.structured_blocks(LD_JSON_SELECTOR)?))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First non-empty string or number found at a dotted `path`
    /// (e.g. `object.geo.latitude`) in any node.
    pub fn text(&self, path: &str) -> Option<String> {
        self.nodes
            .iter()
            .filter_map(|node| lookup(node, path))
            .find_map(scalar_text)
    }

    /// [`Self::text`] over several paths, first hit wins.
    pub fn first_text(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|path| self.text(path))
    }

    /// Names listed at `path`: plain strings or objects carrying `name`.
    pub fn names(&self, path: &str) -> Vec<String> {
        let Some(items) = self
            .nodes
            .iter()
            .filter_map(|node| lookup(node, path))
            .find_map(Value::as_array)
        else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => item.get("name").and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect()
    }
}

fn collect_nodes(value: Value, nodes: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, nodes);
            }
        }
        Value::Object(mut map) => {
            if let Some(Value::Array(graph)) = map.remove("@graph") {
                for item in graph {
                    collect_nodes(item, nodes);
                }
            }
            if !map.is_empty() {
                nodes.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => non_empty(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Trimmed `text`, or `None` when nothing is left.
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed text of the first element matching `selector`, if non-empty.
pub fn text_of(page: &dyn PageHandle, selector: &str) -> Result<Option<String>, RenderError> {
    Ok(page
        .query(selector)?
        .and_then(|element| non_empty(element.text())))
}

/// Trimmed `content` attribute of the first matching `<meta>`, if non-empty.
pub fn meta_content(page: &dyn PageHandle, selector: &str) -> Result<Option<String>, RenderError> {
    Ok(page
        .query(selector)?
        .and_then(|element| element.attr("content").and_then(non_empty)))
}
