//! Scanner and watcher configuration.
//!
//! Options live in `.nexus/config.json` under the project root. A missing
//! file means defaults; a malformed one is an error rather than a silent
//! fallback.

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding project-local state.
pub const CONFIG_DIR: &str = ".nexus";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Directory names skipped by default.
const DEFAULT_IGNORE_DIRS: &[&str] = &["node_modules", ".git", CONFIG_DIR];

/// Options for scanning and watching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Follow symbolic links when walking directories.
    pub follow_symlinks: bool,

    /// Walk into hidden files and directories.
    pub include_hidden: bool,

    /// Directory names that are never entered.
    pub ignore_dirs: Vec<String>,

    /// How long the watcher batches events for, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            debounce_ms: 200,
        }
    }
}

impl IndexOptions {
    /// Where the config for `root` lives.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads options for a project root, defaulting when no file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }

        let bytes = fs::read(&path).map_err(|source| ServiceError::ConfigIo {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ServiceError::ConfigInvalid { path, source })
    }

    /// Writes the options to the project's config file, creating the
    /// directory if needed.
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::config_path(root);
        let io_err = |source| ServiceError::ConfigIo {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(root.join(CONFIG_DIR)).map_err(io_err)?;
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            ServiceError::ConfigInvalid {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json).map_err(io_err)?;
        Ok(path)
    }

    /// Whether a directory with this name should be skipped.
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignore_dirs.iter().any(|d| d == name)
    }

    /// Whether any component of `path` is ignored or hidden.
    ///
    /// `path` must be relative to a scan root. Components above the root
    /// (a temp dir named `.tmpXYZ`, say) must not count.
    pub fn excludes(&self, path: &Path) -> bool {
        path.components().any(|c| match c {
            std::path::Component::Normal(name) => name.to_str().is_some_and(|name| {
                self.is_ignored_dir(name) || (!self.include_hidden && name.starts_with('.'))
            }),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let options = IndexOptions::load(dir.path()).unwrap();
        assert_eq!(options, IndexOptions::default());
        assert!(options.is_ignored_dir("node_modules"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let options = IndexOptions {
            follow_symlinks: true,
            debounce_ms: 50,
            ..Default::default()
        };
        let path = options.save(dir.path()).unwrap();
        assert!(path.ends_with(".nexus/config.json"));
        assert_eq!(IndexOptions::load(dir.path()).unwrap(), options);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            IndexOptions::config_path(dir.path()),
            r#"{ "include_hidden": true }"#,
        )
        .unwrap();

        let options = IndexOptions::load(dir.path()).unwrap();
        assert!(options.include_hidden);
        assert_eq!(options.debounce_ms, 200);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        fs::write(IndexOptions::config_path(dir.path()), "{ nope").unwrap();

        assert!(matches!(
            IndexOptions::load(dir.path()),
            Err(ServiceError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_excludes() {
        let options = IndexOptions::default();
        assert!(options.excludes(Path::new("proj/node_modules/rp/manifest.json")));
        assert!(options.excludes(Path::new("proj/.hidden/a.json")));
        assert!(!options.excludes(Path::new("proj/rp/entity/cow.json")));
    }
}
