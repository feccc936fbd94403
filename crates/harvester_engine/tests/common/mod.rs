#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use harvester_engine::{FailureKind, FetchMetadata, FetchOutput, Fetcher, RenderError};

pub const LISTING: &str = "https://listing.test/alquiler";

static LOGGING: Once = Once::new();

pub fn init_logging() {
    LOGGING.call_once(harvest_logging::initialize_for_tests);
}

/// One scripted answer to a fetch.
#[derive(Debug, Clone)]
pub enum Reply {
    Html(String),
    Fail(FailureKind),
    /// Answers only after `delay`, to trip navigation timeouts.
    Slow(Duration, String),
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    pages: HashMap<String, String>,
    fallback: Option<String>,
    requests: Vec<String>,
}

/// In-memory site. Queued replies for a URL are used first, then the fixed
/// page, then the fallback page; anything else is a 404.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<Script>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), html.into());
        self
    }

    pub fn queue(self, url: &str, replies: Vec<Reply>) -> Self {
        self.script
            .lock()
            .unwrap()
            .queued
            .entry(url.to_string())
            .or_default()
            .extend(replies);
        self
    }

    pub fn fallback(self, html: impl Into<String>) -> Self {
        self.script.lock().unwrap().fallback = Some(html.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == url).count()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut script = self.script.lock().unwrap();
        script.requests.push(url.to_string());
        if let Some(reply) = script.queued.get_mut(url).and_then(VecDeque::pop_front) {
            return reply;
        }
        if let Some(html) = script.pages.get(url) {
            return Reply::Html(html.clone());
        }
        match &script.fallback {
            Some(html) => Reply::Html(html.clone()),
            None => Reply::Fail(FailureKind::HttpStatus(404)),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, RenderError> {
        let html = match self.next_reply(url) {
            Reply::Html(html) => html,
            Reply::Fail(kind) => return Err(RenderError::new(kind, format!("scripted {url}"))),
            Reply::Slow(delay, html) => {
                tokio::time::sleep(delay).await;
                html
            }
        };
        let bytes = html.into_bytes();
        Ok(FetchOutput {
            metadata: FetchMetadata {
                final_url: url.to_string(),
                content_type: Some("text/html; charset=utf-8".to_string()),
                byte_len: bytes.len() as u64,
            },
            bytes,
        })
    }
}

/// Results page with the given pagination hrefs and card hrefs.
pub fn listing_page(page_links: &[&str], cards: &[&str]) -> String {
    let pagination = if page_links.is_empty() {
        String::new()
    } else {
        let items: String = page_links
            .iter()
            .map(|href| {
                format!(r#"<li><a class="ant-pagination-item-link" href="{href}">›</a></li>"#)
            })
            .collect();
        format!(r#"<ul class="search-results-pagination">{items}</ul>"#)
    };
    let cards: String = cards
        .iter()
        .map(|href| format!(r#"<div class="lc-card"><a class="lc-cardCover" href="{href}"></a></div>"#))
        .collect();
    format!("<html><body><div class=\"results\">{cards}</div>{pagination}</body></html>")
}

/// Detail page builder; `None` leaves the element out entirely.
#[derive(Debug, Clone)]
pub struct DetailPage {
    pub title: Option<String>,
    pub og_title: Option<String>,
    pub description: Option<String>,
    pub og_description: Option<String>,
    pub ld_json: Option<String>,
    pub price: Option<String>,
    pub operation: Option<String>,
    pub location: Vec<String>,
    pub summary: Vec<String>,
    pub sheet: Vec<(String, String)>,
}

impl Default for DetailPage {
    fn default() -> Self {
        Self {
            title: Some("Departamento amoblado en Equipetrol".into()),
            og_title: Some("Departamento en alquiler | Infocasas".into()),
            description: Some("Amplio departamento con vista a la ciudad.".into()),
            og_description: Some("Departamento en Equipetrol".into()),
            ld_json: Some(
                r#"{"@context":"https://schema.org","@type":"RentAction","object":{"@type":"Apartment","name":"Departamento LD","description":"Descripcion LD","geo":{"@type":"GeoCoordinates","latitude":-17.7712,"longitude":-63.1957},"amenityFeature":[{"@type":"LocationFeatureSpecification","name":"Piscina"},{"name":"Gimnasio"}]}}"#
                    .into(),
            ),
            price: Some("US$ 650".into()),
            operation: Some("Alquiler".into()),
            location: vec![" Equipetrol ".into(), "Santa Cruz de la Sierra".into()],
            summary: vec!["2 Dorm.".into(), "2 Baños".into(), "95 m²".into()],
            sheet: vec![
                ("Tipo de Propiedad".into(), "Departamento".into()),
                ("Dormitorios".into(), "2".into()),
                ("Price".into(), "650".into()),
            ],
        }
    }
}

impl DetailPage {
    /// A page with nothing but a readiness signal.
    pub fn bare() -> Self {
        Self {
            title: None,
            og_title: None,
            description: None,
            og_description: None,
            ld_json: None,
            price: None,
            operation: None,
            location: Vec::new(),
            summary: Vec::new(),
            sheet: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        let mut head = String::new();
        if let Some(title) = &self.og_title {
            head.push_str(&format!(r#"<meta property="og:title" content="{title}">"#));
        }
        if let Some(description) = &self.og_description {
            head.push_str(&format!(
                r#"<meta property="og:description" content="{description}">"#
            ));
        }
        if let Some(json) = &self.ld_json {
            head.push_str(&format!(
                r#"<script type="application/ld+json">{json}</script>"#
            ));
        }

        let mut body = String::new();
        if let Some(title) = &self.title {
            body.push_str(&format!("<h1>{title}</h1>"));
        }
        if !self.location.is_empty() {
            let parts: String = self.location.iter().map(|p| format!("<p>{p}</p>")).collect();
            body.push_str(&format!(r#"<div class="property-location-tag">{parts}</div>"#));
        }
        if let Some(price) = &self.price {
            body.push_str(&format!(
                r#"<div class="ant-typography price"><strong>{price}</strong></div>"#
            ));
        }
        if let Some(operation) = &self.operation {
            body.push_str(&format!(
                r#"<span class="ant-typography ant-typography-secondary operation_type">{operation}</span>"#
            ));
        }
        let spans: String = self
            .summary
            .iter()
            .map(|s| {
                format!(
                    r#"<span class="ant-typography ant-typography-ellipsis ant-typography-ellipsis-single-line">{s}</span>"#
                )
            })
            .collect();
        body.push_str(&format!(r#"<div class="summary">{spans}</div>"#));
        if let Some(description) = &self.description {
            body.push_str(&format!(
                r#"<div class="ant-typography property-description">{description}</div>"#
            ));
        }
        if !self.sheet.is_empty() {
            let rows: String = self
                .sheet
                .iter()
                .map(|(label, value)| {
                    format!(
                        r#"<div class="ant-row"><div class="ant-space-item"><span class="ant-typography">{label}</span></div><div class="ant-space-item"><strong>{value}</strong></div></div>"#
                    )
                })
                .collect();
            body.push_str(&format!(
                r#"<div class="jsx-952467510 technical-sheet">{rows}<div class="ant-row"><span class="ant-typography ant-typography-secondary">Ver más</span></div></div>"#
            ));
        }

        format!("<!DOCTYPE html><html><head>{head}</head><body>{body}</body></html>")
    }
}
