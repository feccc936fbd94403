//! Harvester core: listing/record domain types and the pure harvest state machine.
mod effect;
mod frontier;
mod item_url;
mod msg;
mod record;
mod row;
mod source;
mod state;
mod update;

pub use effect::Effect;
pub use frontier::{AddOutcome, Frontier};
pub use item_url::{ItemUrl, RejectReason};
pub use msg::Msg;
pub use record::{FieldValue, Price, RawFieldSet, Record, TransactionType, PRICE_ON_REQUEST};
pub use row::{
    columns_for, flatten, flatten_value, Column, Row, CANONICAL_COLUMNS, LIST_DELIMITER,
    PAIR_SEPARATOR,
};
pub use source::{ListingSource, PageUrlPattern, PaginationStrategy};
pub use state::{
    ExtractionFailure, FailureStage, HarvestResult, HarvestState, HarvestStats, Phase,
};
pub use update::update;
