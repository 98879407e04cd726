//! Runtime configuration, read from an optional TOML file.
//!
//! ```toml
//! data_dir = ".telephone"
//! session_id = "cm501-fall"
//! snapshot_interval = 5
//! teacher_passcode = "2025"
//!
//! [sections]
//! 1 = ["Ava", "Nia"]
//! 2 = ["Zoe"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::access::DEFAULT_PASSCODE;
use crate::generator::DEFAULT_PROMPT_SUFFIX;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub session_id: String,
    /// Snapshot every N events; 0 disables snapshots.
    pub snapshot_interval: u64,
    pub teacher_passcode: String,
    pub prompt_suffix: String,
    /// Picker rosters keyed by section name.
    pub sections: BTreeMap<String, Vec<String>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".telephone"),
            session_id: "default".to_string(),
            snapshot_interval: 5,
            teacher_passcode: DEFAULT_PASSCODE.to_string(),
            prompt_suffix: DEFAULT_PROMPT_SUFFIX.to_string(),
            sections: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    pub fn picker_history_path(&self) -> PathBuf {
        self.data_dir.join("picker.json")
    }
}
