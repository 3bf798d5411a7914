//! Catalog configuration loaded through figment.
//!
//! A catalog file lists caller-defined codes by name:
//!
//! ```yaml
//! codes:
//!   quota_exceeded:
//!     code: 1003
//!     title: Quota exceeded
//!   rate_limited:
//!     code: 1004
//! ```
//!
//! With env overrides enabled, variables prefixed with `CODED_ERRORS_` are
//! merged on top of the file, nested keys separated by `__`:
//! `CODED_ERRORS_CODES__QUOTA_EXCEEDED__CODE=1005` replaces the code above.
//! figment lower-cases env keys, so write names lower-case in the file for
//! overrides to land on the same entry. Names are upper-cased once they are
//! registered in a [`CodeCatalog`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Yaml};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, CodeCatalog};
use crate::code::ErrorCode;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CODED_ERRORS_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Code entries keyed by name.
    pub codes: BTreeMap<String, CodeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: ErrorCode,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error code catalog file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read error code catalog: {0}")]
    Figment(#[source] Box<figment::Error>),
    #[error("invalid error code catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl CatalogConfig {
    /// Loads `path` as YAML, optionally merging `CODED_ERRORS_` env vars on top.
    ///
    /// # Errors
    /// - [`ConfigError::NotFound`] if `path` is not a file
    /// - [`ConfigError::Figment`] if the merged sources do not deserialize
    pub fn load(path: &Path, env_override: bool) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut figment = Figment::new().merge(Yaml::file(path));
        if env_override {
            tracing::debug!(prefix = ENV_PREFIX, "env overrides enabled for error code catalog");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config = Self::from_figment(&figment)?;
        tracing::info!(
            path = %path.display(),
            codes = config.codes.len(),
            "loaded error code catalog"
        );
        Ok(config)
    }

    /// Extracts a config from an already assembled figment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Figment`] if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// Parses an inline YAML document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Figment`] if the YAML is malformed or does not
    /// match the expected shape.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::from_figment(&Figment::from(Yaml::string(yaml)))
    }
}

impl CodeCatalog {
    /// [`CatalogConfig::load`] followed by [`CodeCatalog::from_config`].
    ///
    /// # Errors
    /// Any [`ConfigError`] from loading, or [`ConfigError::Catalog`] when an
    /// entry cannot be registered.
    pub fn load(path: &Path, env_override: bool) -> Result<Self, ConfigError> {
        let config = CatalogConfig::load(path, env_override)?;
        Ok(Self::from_config(&config)?)
    }
}
