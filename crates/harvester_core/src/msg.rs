use crate::{ExtractionFailure, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the harvest.
    Start,
    /// The listing's pagination control was read.
    PageCountResolved(u32),
    /// Item URLs collected from one results page (raw, not yet de-duplicated).
    PageScanned { page: u32, urls: Vec<String> },
    /// A results page could not be loaded; it contributes nothing.
    PageFailed { page: u32, cause: String },
    /// A detail page produced a record.
    ItemExtracted(Record),
    /// A detail page failed after every retry.
    ItemFailed(ExtractionFailure),
}
