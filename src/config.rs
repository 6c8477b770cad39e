//! Runtime settings at ~/.plotloc/config.json.
//!
//! Every field is optional in the file. A missing file means defaults; a
//! malformed file is logged and ignored.

use crate::location::search::{clamp_limit, DEFAULT_LIMIT};
use crate::location::{Dataset, DatasetSource, LocationError, LocationStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// JSON dataset replacing the built-in hierarchy.
    pub dataset: Option<PathBuf>,
    /// Per-type search cap when the request gives none.
    pub default_limit: usize,
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            dataset: None,
            default_limit: DEFAULT_LIMIT,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Load from the default location.
    pub fn load() -> Self {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Settings>(&data) {
            Ok(mut settings) => {
                settings.default_limit = clamp_limit(settings.default_limit);
                settings
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring malformed settings file"
                );
                Self::default()
            }
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".plotloc")
            .join("config.json")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the store from the configured dataset, or the built-in one.
    pub fn open_store(&self) -> Result<LocationStore, LocationError> {
        match &self.dataset {
            Some(path) => {
                let dataset = Dataset::load_from(path)?;
                LocationStore::new(dataset, DatasetSource::File(path.clone()))
            }
            None => LocationStore::builtin(),
        }
    }
}
