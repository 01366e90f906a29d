//! File watcher for live updates.
//!
//! Uses notify with debouncing so an editor's burst of writes arrives as
//! one event. Events are forwarded on a tokio channel and fed straight
//! into an [`IndexHandle`](crate::IndexHandle).

use crate::config::IndexOptions;
use crate::error::Result;
use crate::walk::PackWalker;
use nexus_core::is_content_file;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Type of file change detected.
///
/// The debouncer folds creates and writes together, so a path that
/// still exists is reported as changed and one that's gone as deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Changed(PathBuf),
    Deleted(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Deleted(path) => path,
        }
    }

    /// Turns a raw debounced path into the changes it stands for.
    ///
    /// A directory that appears, say one moved into a pack, is reported
    /// once for the directory alone, so its content files are walked and
    /// each reported as changed. Deleted directories are kept since they
    /// take their records along.
    fn from_path(path: PathBuf, options: &IndexOptions) -> Vec<Self> {
        if path.is_dir() {
            PackWalker::new(&path, options).files().map(Self::Changed).collect()
        } else if path.exists() {
            if is_content_file(&path) {
                vec![Self::Changed(path)]
            } else {
                Vec::new()
            }
        } else if is_content_file(&path) || path.extension().is_none() {
            vec![Self::Deleted(path)]
        } else {
            Vec::new()
        }
    }
}

/// Watches project roots for file changes.
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    receiver: mpsc::UnboundedReceiver<FileChange>,
}

impl FileWatcher {
    /// Starts watching every root recursively.
    pub fn new(roots: &[PathBuf], options: &IndexOptions) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let filter = options.clone();
        let watched: Vec<PathBuf> = roots.to_vec();

        let mut debouncer = new_debouncer(
            Duration::from_millis(options.debounce_ms),
            move |res: DebounceEventResult| match res {
                Ok(events) => {
                    let mut seen = HashSet::new();
                    for event in events {
                        if is_excluded(&watched, &event.path, &filter) {
                            continue;
                        }
                        for change in FileChange::from_path(event.path, &filter) {
                            if !seen.insert(change.path().to_path_buf()) {
                                continue;
                            }
                            debug!("File event: {:?}", change);
                            if tx.send(change).is_err() {
                                warn!("Failed to send file change event");
                            }
                        }
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            },
        )?;

        for root in roots {
            debouncer.watcher().watch(root, RecursiveMode::Recursive)?;
            info!("Watching {} for changes", root.display());
        }

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
        })
    }

    /// Waits for the next change. `None` once the watcher is gone.
    pub async fn recv(&mut self) -> Option<FileChange> {
        self.receiver.recv().await
    }

    /// Returns any pending changes without waiting.
    pub fn poll(&mut self) -> Vec<FileChange> {
        let mut changes = Vec::new();
        while let Ok(change) = self.receiver.try_recv() {
            changes.push(change);
        }
        changes
    }
}

/// Whether `path` sits in an ignored or hidden directory below a root.
fn is_excluded(roots: &[PathBuf], path: &Path, options: &IndexOptions) -> bool {
    roots
        .iter()
        .find_map(|root| path.strip_prefix(root).ok())
        .is_some_and(|rel| options.excludes(rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let options = IndexOptions::default();

        let json = dir.path().join("a.json");
        fs::write(&json, "{}").unwrap();
        assert_eq!(
            FileChange::from_path(json.clone(), &options),
            vec![FileChange::Changed(json.clone())]
        );

        let lang = dir.path().join("en_US.lang");
        fs::write(&lang, "").unwrap();
        assert!(FileChange::from_path(lang.clone(), &options).is_empty());

        fs::remove_file(&json).unwrap();
        assert_eq!(
            FileChange::from_path(json.clone(), &options),
            vec![FileChange::Deleted(json)]
        );

        let gone_dir = dir.path().join("entity");
        assert_eq!(
            FileChange::from_path(gone_dir.clone(), &options),
            vec![FileChange::Deleted(gone_dir)]
        );
    }

    #[test]
    fn test_appearing_directory_reports_its_files() {
        let dir = tempdir().unwrap();
        let options = IndexOptions::default();
        let moved = dir.path().join("RP/animations");
        fs::create_dir_all(moved.join("mobs")).unwrap();
        fs::write(moved.join("cow.json"), "{}").unwrap();
        fs::write(moved.join("mobs/pig.json"), "{}").unwrap();
        fs::write(moved.join("notes.txt"), "").unwrap();
        fs::create_dir_all(moved.join("node_modules")).unwrap();
        fs::write(moved.join("node_modules/x.json"), "{}").unwrap();

        assert_eq!(
            FileChange::from_path(moved.clone(), &options),
            vec![
                FileChange::Changed(moved.join("cow.json")),
                FileChange::Changed(moved.join("mobs/pig.json")),
            ]
        );

        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert!(FileChange::from_path(empty, &options).is_empty());
    }

    #[test]
    fn test_is_excluded_is_relative_to_root() {
        let options = IndexOptions::default();
        let roots = vec![PathBuf::from("/work/.tmp123")];
        assert!(!is_excluded(&roots, Path::new("/work/.tmp123/rp/a.json"), &options));
        assert!(is_excluded(
            &roots,
            Path::new("/work/.tmp123/node_modules/a.json"),
            &options
        ));
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let dir = tempdir().unwrap();
        let mut watcher = FileWatcher::new(&[dir.path().to_path_buf()], &IndexOptions::default())
            .unwrap();
        assert!(watcher.poll().is_empty());
    }
}
