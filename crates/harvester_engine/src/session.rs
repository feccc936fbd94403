//! Persisted browsing session: a JSON array of cookie records.
//!
//! The layout matches the cookie dumps produced by browser automation tools
//! (`name`, `value`, `domain`, `path`, `expires`, `httpOnly`, `secure`, ...);
//! fields this crate does not interpret are carried through untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use harvest_logging::harvest_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persist::{write_file_atomic, PersistError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch; `-1` or absent for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_path() -> String {
    "/".to_string()
}

impl CookieRecord {
    pub fn new(name: &str, value: &str, domain: &str, secure: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure,
            extra: BTreeMap::new(),
        }
    }

    /// Domain without the leading dot of a domain cookie.
    pub fn host(&self) -> &str {
        self.domain.trim_start_matches('.')
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write session file: {0}")]
    Persist(#[from] PersistError),
}

/// Loads persisted cookies. A missing file is an empty session.
pub fn load_session(path: &Path) -> Result<Vec<CookieRecord>, SessionError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let cookies: Vec<CookieRecord> =
        serde_json::from_str(&content).map_err(|source| SessionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    harvest_info!("Loaded {} cookies from {:?}", cookies.len(), path);
    Ok(cookies)
}

/// Writes the session, replacing any previous file.
pub fn save_session(path: &Path, cookies: &[CookieRecord]) -> Result<(), SessionError> {
    let content = serde_json::to_string_pretty(cookies)?;
    write_file_atomic(path, content.as_bytes())?;
    harvest_info!("Saved {} cookies to {:?}", cookies.len(), path);
    Ok(())
}
