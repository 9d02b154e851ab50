// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `guardcheck.json` configuration.
//!
//! ```json
//! {
//!   "rules": ["guarded-by/*"],
//!   "exclude": ["guarded-by/invalid"],
//!   "unresolved_as_error": false
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::types::CheckOpts;

/// File name looked up in the checked directory.
pub const CONFIG_FILE: &str = "guardcheck.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rules: Vec<String>,
    pub exclude: Vec<String>,
    pub unresolved_as_error: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `guardcheck.json` from `dir` if there is one.
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }

    pub fn into_opts(self) -> CheckOpts {
        CheckOpts {
            rules: self.rules,
            excludes: self.exclude,
            unresolved_as_error: self.unresolved_as_error,
        }
    }
}
