use std::path::PathBuf;

use harvester_core::ListingSource;
use harvester_engine::sites::infocasas;
use harvester_engine::{FetchSettings, HarvestSettings};

/// Listings harvested on every run, in order.
pub const LISTING_URLS: &[&str] = &["https://www.infocasas.com.bo/alquiler"];

pub const OUTPUT_DIR: &str = "output";
pub const SESSION_FILE: &str = "cookies.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sources: Vec<ListingSource>,
    pub output_dir: PathBuf,
    pub session_path: PathBuf,
    pub fetch: FetchSettings,
    pub harvest: HarvestSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: LISTING_URLS
                .iter()
                .map(|url| infocasas::listing_source(url))
                .collect(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            session_path: PathBuf::from(SESSION_FILE),
            fetch: FetchSettings::default(),
            harvest: HarvestSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn with_sources(mut self, sources: Vec<ListingSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    pub fn with_harvest(mut self, harvest: HarvestSettings) -> Self {
        self.harvest = harvest;
        self
    }
}
