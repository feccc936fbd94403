//! Harvester engine: rendering boundary, per-site extraction and the IO side
//! of a harvest run.
mod cookies;
mod decode;
mod export;
mod extract;
mod fetch;
mod filename;
mod harvest;
mod links;
mod paginate;
mod persist;
mod render;
mod retry;
mod session;
pub mod sites;
mod types;

pub use cookies::SessionJar;
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use export::{
    export_harvest, sheet_cells, ExportSummary, SinkError, TabularSink, WorkbookSink,
    MAX_CELL_CHARS, MAX_SHEET_COLUMNS, MAX_SHEET_ROWS, SHEET_NAME,
};
pub use extract::{
    meta_content, non_empty, text_of, ExtractError, RecordExtractor, StructuredData,
    LD_JSON_SELECTOR,
};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::workbook_filename;
pub use harvest::{HarvestError, HarvestSettings, Harvester};
pub use links::anchor_urls;
pub use paginate::{ListingPaginator, PageFailure};
pub use persist::{ensure_dir, write_file_atomic, PersistError};
pub use render::{Element, PageHandle, Readiness, Renderer, StaticPage, StaticRenderer};
pub use retry::{with_retries, RetryError, RetryPolicy};
pub use session::{load_session, save_session, CookieRecord, SessionError};
pub use types::{
    ChannelProgressSink, FailureKind, FetchMetadata, FetchOutput, HarvestEvent, NoProgress,
    ProgressSink, RenderError,
};
