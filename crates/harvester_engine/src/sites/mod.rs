//! Per-site listing strategies and record extractors.
pub mod infocasas;

pub use infocasas::InfocasasExtractor;
