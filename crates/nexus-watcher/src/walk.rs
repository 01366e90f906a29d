//! Lazy, restartable directory walking.
//!
//! A [`PackWalker`] describes a walk; iterating it starts a fresh one, so
//! the same walker can be iterated again after the tree changes.

use crate::config::IndexOptions;
use ignore::{Walk, WalkBuilder};
use nexus_core::classify::MANIFEST_FILE;
use nexus_core::is_content_file;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Enumerates the content files under one directory.
#[derive(Debug, Clone)]
pub struct PackWalker {
    root: PathBuf,
    options: IndexOptions,
    nested: Vec<PathBuf>,
}

impl PackWalker {
    pub fn new(root: impl Into<PathBuf>, options: &IndexOptions) -> Self {
        Self {
            root: root.into(),
            options: options.clone(),
            nested: Vec::new(),
        }
    }

    /// Leaves out the given directories, typically packs nested inside
    /// this one that get walked on their own.
    pub fn skipping(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.nested.extend(dirs);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a new walk.
    pub fn files(&self) -> PackFiles {
        let ignore_dirs = self.options.ignore_dirs.clone();
        let nested = self.nested.clone();

        // Every file is enumerated; ignore files don't apply to packs.
        let walk = WalkBuilder::new(&self.root)
            .hidden(!self.options.include_hidden)
            .ignore(false)
            .parents(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                let ignored = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore_dirs.iter().any(|d| d == name));
                !ignored && !nested.iter().any(|dir| dir == entry.path())
            })
            .build();

        PackFiles { walk }
    }
}

impl IntoIterator for &PackWalker {
    type Item = PathBuf;
    type IntoIter = PackFiles;

    fn into_iter(self) -> PackFiles {
        self.files()
    }
}

/// One in-progress walk. Yields files with a content extension.
pub struct PackFiles {
    walk: Walk,
}

impl Iterator for PackFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.walk.next()? {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    if is_content_file(entry.path()) {
                        return Some(entry.into_path());
                    }
                }
                Err(e) => debug!("Skipping unreadable entry: {}", e),
            }
        }
    }
}

/// Finds every `manifest.json` under `root`, in path order.
pub fn find_manifests(root: &Path, options: &IndexOptions) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| options.excludes(Path::new(name)))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE)
        .map(|entry| entry.into_path())
        .collect()
}
