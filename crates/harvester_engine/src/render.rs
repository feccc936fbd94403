//! Rendering-engine boundary.
//!
//! A [`Renderer`] hands out independent [`PageHandle`]s; a page is navigated
//! to a URL, waits for a readiness condition, and answers DOM queries with
//! owned [`Element`] snapshots. [`StaticRenderer`] implements the boundary
//! over a plain HTTP [`Fetcher`] and `scraper`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use harvest_logging::harvest_debug;
use scraper::{ElementRef, Html, Selector};

use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::session::CookieRecord;
use crate::{FailureKind, RenderError};

/// What a navigation waits for before it counts as loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The document arrived.
    Loaded,
    /// At least one of these selectors matches.
    AnyOf(Vec<String>),
}

/// Snapshot of a DOM element, detached from its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    text: String,
    raw_text: String,
    attrs: BTreeMap<String, String>,
    html: String,
}

impl Element {
    fn from_ref(element: ElementRef<'_>) -> Self {
        let raw_text: String = element.text().collect();
        Self {
            text: collapse_whitespace(&raw_text),
            raw_text,
            attrs: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            html: element.html(),
        }
    }

    /// Text content with whitespace runs collapsed and trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text content exactly as it appears in the document.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// First descendant matching `selector`.
    pub fn query(&self, selector: &str) -> Result<Option<Element>, RenderError> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    /// Every descendant matching `selector`, in document order.
    pub fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        let Some(outer) = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
        else {
            return Ok(Vec::new());
        };
        Ok(outer.select(&selector).map(Element::from_ref).collect())
    }
}

/// One browsing context.
#[async_trait::async_trait]
pub trait PageHandle: Send + Sync {
    /// Loads `url` and waits for `readiness`, bounded by `timeout`.
    async fn navigate(
        &mut self,
        url: &str,
        readiness: &Readiness,
        timeout: Duration,
    ) -> Result<(), RenderError>;

    /// URL of the loaded document after redirects.
    fn url(&self) -> Option<&str>;

    fn query(&self, selector: &str) -> Result<Option<Element>, RenderError>;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError>;

    /// Raw text of every block matching `selector`, for parsing as
    /// structured data (e.g. `script[type="application/ld+json"]`).
    fn structured_blocks(&self, selector: &str) -> Result<Vec<String>, RenderError> {
        Ok(self
            .query_all(selector)?
            .into_iter()
            .map(|element| element.raw_text)
            .collect())
    }

    fn structured_block(&self, selector: &str) -> Result<Option<String>, RenderError> {
        Ok(self.structured_blocks(selector)?.into_iter().next())
    }
}

/// Source of fresh browsing contexts sharing one session.
#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn PageHandle>, RenderError>;

    fn cookies(&self) -> Vec<CookieRecord>;

    fn load_cookies(&self, cookies: &[CookieRecord]);
}

/// Renderer for server-rendered sites: pages are fetched over HTTP and
/// queried without executing scripts.
pub struct StaticRenderer<F> {
    fetcher: Arc<F>,
}

impl<F: Fetcher + 'static> StaticRenderer<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher + 'static> Renderer for StaticRenderer<F> {
    async fn open_page(&self) -> Result<Box<dyn PageHandle>, RenderError> {
        Ok(Box::new(StaticPage {
            fetcher: self.fetcher.clone(),
            document: None,
        }))
    }

    fn cookies(&self) -> Vec<CookieRecord> {
        self.fetcher.cookies()
    }

    fn load_cookies(&self, cookies: &[CookieRecord]) {
        self.fetcher.load_cookies(cookies);
    }
}

struct LoadedDocument {
    url: String,
    html: String,
}

/// Holds the document as text; `scraper::Html` is parsed per query since it
/// cannot be kept across await points.
pub struct StaticPage<F> {
    fetcher: Arc<F>,
    document: Option<LoadedDocument>,
}

impl<F> StaticPage<F> {
    fn html(&self) -> Result<&str, RenderError> {
        self.document
            .as_ref()
            .map(|doc| doc.html.as_str())
            .ok_or_else(|| RenderError::new(FailureKind::NoDocument, "navigate first"))
    }
}

#[async_trait::async_trait]
impl<F: Fetcher + 'static> PageHandle for StaticPage<F> {
    async fn navigate(
        &mut self,
        url: &str,
        readiness: &Readiness,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        self.document = None;
        let output = tokio::time::timeout(timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| {
                RenderError::new(
                    FailureKind::Timeout,
                    format!("navigation exceeded {}s", timeout.as_secs_f32()),
                )
            })??;

        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| RenderError::new(FailureKind::Decode, err.to_string()))?;
        harvest_debug!(
            "Loaded {} as {} ({} bytes)",
            output.metadata.final_url,
            decoded.encoding_label,
            output.metadata.byte_len
        );

        let ready = is_ready(&decoded.html, readiness)?;
        self.document = Some(LoadedDocument {
            url: output.metadata.final_url,
            html: decoded.html,
        });
        if ready {
            Ok(())
        } else {
            Err(RenderError::new(
                FailureKind::NotReady,
                format!("{url}: none of {readiness:?} present"),
            ))
        }
    }

    fn url(&self) -> Option<&str> {
        self.document.as_ref().map(|doc| doc.url.as_str())
    }

    fn query(&self, selector: &str) -> Result<Option<Element>, RenderError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(self.html()?);
        let found = document.select(&selector).next().map(Element::from_ref);
        Ok(found)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, RenderError> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(self.html()?);
        let found = document.select(&selector).map(Element::from_ref).collect();
        Ok(found)
    }
}

fn is_ready(html: &str, readiness: &Readiness) -> Result<bool, RenderError> {
    match readiness {
        Readiness::Loaded => Ok(true),
        Readiness::AnyOf(selectors) => {
            let document = Html::parse_document(html);
            for selector in selectors {
                let selector = parse_selector(selector)?;
                if document.select(&selector).next().is_some() {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|_| {
        RenderError::new(
            FailureKind::InvalidSelector,
            format!("cannot parse {selector:?}"),
        )
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
