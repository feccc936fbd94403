use std::fmt;

use harvester_core::{ExtractionFailure, ItemUrl, RejectReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Failure at the rendering-engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RenderError {
    pub kind: FailureKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Navigation or readiness wait ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout | FailureKind::NotReady)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    /// The page loaded but its readiness signal never appeared.
    NotReady,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    /// No page is loaded in this context yet.
    NoDocument,
    InvalidSelector,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::NotReady => write!(f, "readiness signal not found"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::NoDocument => write!(f, "no document loaded"),
            FailureKind::InvalidSelector => write!(f, "invalid selector"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Progress notifications emitted while a listing is harvested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    PageCount { source: String, pages: u32 },
    PageScanned { page: u32, urls: usize },
    PageFailed { page: u32, cause: String },
    UrlRejected { url: String, reason: RejectReason },
    ItemExtracted { url: ItemUrl },
    ItemFailed(ExtractionFailure),
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn emit(&self, _event: HarvestEvent) {}
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<HarvestEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<HarvestEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: HarvestEvent) {
        let _ = self.tx.send(event);
    }
}
