use crate::{ItemUrl, RejectReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the pagination control of the listing's first page.
    ResolvePageCount,
    /// Collect item URLs from 1-based page `page`.
    ScanPage { page: u32 },
    /// The frontier refused a URL. Informational; produces no message.
    UrlRejected { url: String, reason: RejectReason },
    /// Visit a detail page and extract its record.
    ExtractItem { url: ItemUrl },
    /// Every item has been attempted.
    Finish,
}
