//! Layered configuration for the verifier.
//!
//! Layers, later ones win:
//! 1) defaults -> 2) YAML file (if provided) -> 3) env (`ERRORS_CONTRACT__*`)

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables overriding config keys,
/// e.g. `ERRORS_CONTRACT__BASELINE_DIR`.
pub const ENV_PREFIX: &str = "ERRORS_CONTRACT__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(#[source] Box<figment::Error>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifyConfig {
    /// Directory holding approved baselines (`problems/<category>.json`).
    pub baseline_dir: PathBuf,
    /// Output directory of `export-schemas`.
    pub schema_dir: PathBuf,
    /// Render problems in debug mode, with attached debug info, and check them
    /// against `<baseline_dir>/problems-debug/`.
    pub include_debug: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("baselines"),
            schema_dir: PathBuf::from("schemas"),
            include_debug: false,
        }
    }
}

impl VerifyConfig {
    /// Figment with every layer merged; the YAML layer is skipped without a path.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads the layered configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::NotFound`] if `path` is given but is not a file,
    /// and [`ConfigError::Invalid`] if a layer fails to parse or carries an
    /// unknown key.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.is_file()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::from_figment(&Self::figment(path))
    }

    /// Extracts the configuration from an already assembled figment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if extraction fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}
