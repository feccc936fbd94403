//! Harvester binary support: the fixed run configuration and the run loop.
pub mod config;
pub mod run;

pub use config::AppConfig;
pub use run::{run, run_with, RunReport};
