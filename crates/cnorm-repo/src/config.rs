//! # Repository Configuration
//!
//! An optional `cnorm.yaml` at the repository root:
//!
//! ```yaml
//! extension: json     # file extension of document files
//! ignore: [.git]      # directory names skipped during enumeration
//! indent: 4           # indentation of written documents
//! ```
//!
//! Every key is optional; unknown keys are rejected. A missing or empty
//! file yields the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// Name of the configuration file at the repository root.
pub const CONFIG_FILE: &str = "cnorm.yaml";

/// Repository-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub extension: String,
    pub ignore: Vec<String>,
    pub indent: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            extension: "json".to_string(),
            ignore: vec![".git".to_string()],
            indent: 4,
        }
    }
}

impl RepositoryConfig {
    /// Read `cnorm.yaml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> RepoResult<Self> {
        let path = root.join(CONFIG_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(RepoError::Io { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| RepoError::Config { path, source })
    }

    /// True if a directory with this name is skipped during enumeration.
    pub fn is_ignored(&self, dir_name: &str) -> bool {
        self.ignore.iter().any(|i| i == dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(RepositoryConfig::load(dir.path()).unwrap(), RepositoryConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "indent: 2\nignore: [.git, drafts]\n").unwrap();
        let config = RepositoryConfig::load(dir.path()).unwrap();
        assert_eq!(config.indent, 2);
        assert_eq!(config.extension, "json");
        assert!(config.is_ignored("drafts"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "indnet: 2\n").unwrap();
        assert!(matches!(
            RepositoryConfig::load(dir.path()),
            Err(RepoError::Config { .. })
        ));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "\n").unwrap();
        assert_eq!(RepositoryConfig::load(dir.path()).unwrap().indent, 4);
    }
}
