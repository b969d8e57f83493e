//! Runtime configuration.
//!
//! Settings come from a TOML file (or string) with an environment override
//! for the wildcard root:
//!
//! ```toml
//! wildcards_dir = "input/wildcards"
//! max_resolve_iterations = 10
//! default_seed = 0
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `wildcards_dir`.
pub const WILDCARDS_DIR_ENV: &str = "BADMAN_WILDCARDS_DIR";

/// Default cap on fixed-point passes over a prompt.
pub const DEFAULT_MAX_RESOLVE_ITERATIONS: usize = 10;

/// Configuration shared by the registry and the prompt nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesConfig {
    /// Root folder of the `.txt` wildcard files.
    pub wildcards_dir: PathBuf,
    /// Maximum number of full resolve passes before giving up on a fixed point.
    pub max_resolve_iterations: usize,
    /// Seed used by the CLI when none is given.
    pub default_seed: u64,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            wildcards_dir: PathBuf::from("input").join("wildcards"),
            max_resolve_iterations: DEFAULT_MAX_RESOLVE_ITERATIONS,
            default_seed: 0,
        }
    }
}

impl NodesConfig {
    /// Parse a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: NodesConfig = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults with the environment override applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `BADMAN_WILDCARDS_DIR` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(WILDCARDS_DIR_ENV).filter(|v| !v.is_empty()) {
            log::debug!("wildcards_dir overridden by {}", WILDCARDS_DIR_ENV);
            self.wildcards_dir = PathBuf::from(dir);
        }
        self
    }

    /// Replace the wildcard root.
    pub fn with_wildcards_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.wildcards_dir = dir.into();
        self
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_resolve_iterations == 0 {
            return Err(ConfigError::Invalid {
                key: "max_resolve_iterations".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NodesConfig::default();
        assert_eq!(config.max_resolve_iterations, 10);
        assert!(config.wildcards_dir.ends_with("wildcards"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NodesConfig::from_toml_str("wildcards_dir = \"/srv/wc\"").unwrap();
        assert_eq!(config.wildcards_dir, PathBuf::from("/srv/wc"));
        assert_eq!(config.max_resolve_iterations, DEFAULT_MAX_RESOLVE_ITERATIONS);
        assert_eq!(config.default_seed, 0);
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let err = NodesConfig::from_toml_str("max_resolve_iterations = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            NodesConfig::from_toml_str("wildcards_dir = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_seed = 42").unwrap();
        let config = NodesConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_seed, 42);

        assert!(matches!(
            NodesConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Read { .. })
        ));
    }
}
