//! Optional TOML configuration
//!
//! ```toml
//! timeout_ms = 1500
//! keycodes = "/usr/share/vial/keycodes.json"
//! hide_hex_labels = true
//!
//! [exclusions]
//! "Acme 75" = [13, 14, 15]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::keymap::ExclusionSet;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout; the session default applies when unset
    pub timeout_ms: Option<u64>,
    /// Extra keycode table merged over the built-in one
    pub keycodes: Option<PathBuf>,
    /// Blank labels that only decode to the `0x..` fallback
    pub hide_hex_labels: bool,
    /// Visible-key indices to drop, keyed by definition name
    pub exclusions: HashMap<String, Vec<usize>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            keycodes: None,
            hide_hex_labels: true,
            exclusions: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path`, or the default location when `None`
    ///
    /// An explicit path must exist. A missing default file yields the
    /// default config.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = default_config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Exclusion set for a layout, empty when none is configured
    pub fn exclusions_for(&self, name: &str) -> ExclusionSet {
        self.exclusions
            .get(name)
            .map(|indices| indices.iter().copied().collect())
            .unwrap_or_default()
    }
}

/// `$XDG_CONFIG_HOME/vial-export/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

fn dirs_path() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("vial-export")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/vial-export")
    } else {
        PathBuf::from("/tmp/vial-export")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.hide_hex_labels);
        assert!(config.exclusions_for("anything").is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            timeout_ms = 250
            keycodes = "/tmp/keycodes.json"
            hide_hex_labels = false

            [exclusions]
            "Acme 75" = [13, 14, 13]
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_ms, Some(250));
        assert_eq!(config.keycodes, Some(PathBuf::from("/tmp/keycodes.json")));
        assert!(!config.hide_hex_labels);

        let set = config.exclusions_for("Acme 75");
        assert_eq!(set.len(), 2);
        assert!(set.contains(13) && set.contains(14));
        assert!(config.exclusions_for("Other").is_empty());
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(Config::from_toml("timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/vial-export.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
