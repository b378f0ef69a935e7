//! Project configuration.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default symbol prefix used in `.config` files.
pub const DEFAULT_CONFIG_PREFIX: &str = "CONFIG_";

/// Default iteration bound for cyclic dependency components.
pub const DEFAULT_MAX_CYCLE_ITERATIONS: usize = 8;

/// Errors from loading a [`ProjectConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one Kconfig workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Top-level Kconfig file.
    pub root: Option<PathBuf>,
    /// Directories tried after the including file's directory.
    pub search_roots: Vec<PathBuf>,
    /// Values for variables in `source` paths.
    pub env: IndexMap<String, String>,
    pub config_prefix: String,
    pub max_cycle_iterations: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: None,
            search_roots: Vec::new(),
            env: IndexMap::new(),
            config_prefix: DEFAULT_CONFIG_PREFIX.to_string(),
            max_cycle_iterations: DEFAULT_MAX_CYCLE_ITERATIONS,
        }
    }
}

impl ProjectConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_search_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_roots.push(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_config_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config_prefix = prefix.into();
        self
    }

    pub fn with_max_cycle_iterations(mut self, iterations: usize) -> Self {
        self.max_cycle_iterations = iterations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.config_prefix, "CONFIG_");
        assert_eq!(config.max_cycle_iterations, 8);
    }

    #[test]
    fn test_camel_case_fields() {
        let config = ProjectConfig::from_json_str(
            r#"{"root":"/w/Kconfig","searchRoots":["/zephyr"],"env":{"ARCH":"arm"},"configPrefix":"","maxCycleIterations":3}"#,
        )
        .unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/w/Kconfig")));
        assert_eq!(config.search_roots, vec![PathBuf::from("/zephyr")]);
        assert_eq!(config.env.get("ARCH").map(String::as_str), Some("arm"));
        assert_eq!(config.config_prefix, "");
        assert_eq!(config.max_cycle_iterations, 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"configPrefix":"CFG_"}}"#).unwrap();
        let config = ProjectConfig::load(file.path()).unwrap();
        assert_eq!(config.config_prefix, "CFG_");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = ProjectConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ProjectConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
