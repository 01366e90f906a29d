//! The mutable workspace state and its update rules.
//!
//! A [`Workspace`] owns the structure and the reference graph. Every
//! mutation goes through it, ends with a graph rebuild, and bumps the
//! generation. Both halves sit behind `Arc`s so a [`Snapshot`] is a pair
//! of pointer copies; the next mutation copies the structure only if a
//! snapshot still holds it.

use crate::config::IndexOptions;
use crate::scanner::{scan, ScanSummary};
use nexus_core::classify::MANIFEST_FILE;
use nexus_core::{classify, classify_path, extract_file, AddonFile, FileKind, PathClass};
use nexus_graph::{AddonStructure, ReferenceGraph, UsageMap};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A read-only view of the workspace at one generation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub generation: u64,
    pub structure: Arc<AddonStructure>,
    pub graph: Arc<ReferenceGraph>,
}

impl Snapshot {
    /// The indexed kind of `path`, or its classification if not indexed.
    pub fn file_kind(&self, path: &Path) -> FileKind {
        match self.structure.index.find(path) {
            Some(file) => file.kind(),
            None => classify(path),
        }
    }

    pub fn uses_of(&self, path: &Path) -> Option<&UsageMap> {
        self.graph.uses_of(path)
    }

    pub fn used_by(&self, kind: FileKind, identifier: &str) -> &[AddonFile] {
        self.graph.used_by(kind, identifier)
    }
}

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// The whole structure was rebuilt from disk.
    Rescanned { summary: ScanSummary },
    /// A file's record was inserted or replaced.
    Indexed { path: PathBuf, kind: FileKind },
    /// Records were removed.
    Removed { paths: Vec<PathBuf> },
}

pub struct Workspace {
    roots: Vec<PathBuf>,
    options: IndexOptions,
    structure: Arc<AddonStructure>,
    graph: Arc<ReferenceGraph>,
    generation: u64,
}

impl Workspace {
    /// Creates an empty workspace. Nothing is read until [`scan`](Self::scan).
    pub fn new(roots: Vec<PathBuf>, options: IndexOptions) -> Self {
        Self {
            roots,
            options,
            structure: Arc::default(),
            graph: Arc::default(),
            generation: 0,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn structure(&self) -> &AddonStructure {
        &self.structure
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            structure: Arc::clone(&self.structure),
            graph: Arc::clone(&self.graph),
        }
    }

    /// Replaces the structure with a fresh scan of the current roots and
    /// rebuilds the graph once.
    pub fn scan(&mut self) -> ScanSummary {
        let (structure, summary) = scan(&self.roots, &self.options);
        self.structure = Arc::new(structure);
        self.rebuild();
        summary
    }

    /// Like [`scan`](Self::scan), optionally switching to a new root set.
    pub fn rescan(&mut self, roots: Option<Vec<PathBuf>>) -> ScanSummary {
        if let Some(roots) = roots {
            info!("Root set changed to {} roots", roots.len());
            self.roots = roots;
        }
        self.scan()
    }

    /// Applies a created or modified file.
    ///
    /// Returns `None` when nothing changed: the file isn't indexable,
    /// lies outside every pack, or failed to extract. A failed extraction
    /// leaves any earlier record in place.
    pub fn apply_create_or_change(&mut self, path: &Path) -> Option<Change> {
        let kind = classify(path);
        if kind == FileKind::Manifest {
            return Some(self.manifest_changed(path));
        }
        if !kind.is_indexed() {
            return None;
        }
        if !self.is_tracked(path) {
            debug!("Ignoring {} outside known packs", path.display());
            return None;
        }

        let file = match extract_file(path, kind) {
            Ok(file) => file,
            Err(e) if e.is_unreadable() => {
                warn!("Keeping previous record: {}", e);
                return None;
            }
            Err(e) => {
                debug!("Keeping previous record: {}", e);
                return None;
            }
        };

        let structure = Arc::make_mut(&mut self.structure);
        if let Some(previous) = structure.index.find(path).map(AddonFile::kind) {
            if previous != kind {
                debug!("{} changed kind from {} to {}", path.display(), previous, kind);
                structure.index.remove(path, previous);
            }
        }
        structure.index.upsert(file);
        self.rebuild();

        debug!("Indexed {} as {}", path.display(), kind);
        Some(Change::Indexed {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Removes `path` from the buckets of `kind`.
    pub fn apply_delete(&mut self, path: &Path, kind: FileKind) -> Option<Change> {
        if kind == FileKind::Manifest {
            return Some(self.manifest_changed(path));
        }
        if self.structure.index.find(path).map(AddonFile::kind) != Some(kind) {
            return None;
        }

        Arc::make_mut(&mut self.structure).index.remove(path, kind);
        self.rebuild();

        debug!("Removed {} ({})", path.display(), kind);
        Some(Change::Removed {
            paths: vec![path.to_path_buf()],
        })
    }

    /// Removes a deleted path without being told its kind.
    ///
    /// The kind comes from the index, falling back to the path rules. A
    /// deleted directory takes every record beneath it along.
    pub fn apply_delete_path(&mut self, path: &Path) -> Option<Change> {
        if path.file_name().is_some_and(|name| name == MANIFEST_FILE) {
            return Some(self.manifest_changed(path));
        }

        let kind = self
            .structure
            .index
            .find(path)
            .map(AddonFile::kind)
            .or(match classify_path(path) {
                PathClass::Known(kind) if kind.is_indexed() => Some(kind),
                _ => None,
            });
        if let Some(kind) = kind {
            if let Some(change) = self.apply_delete(path, kind) {
                return Some(change);
            }
        }

        self.remove_below(path)
    }

    fn remove_below(&mut self, dir: &Path) -> Option<Change> {
        if self.packs().any(|pack| pack.starts_with(dir)) {
            return Some(self.manifest_changed(dir));
        }

        let doomed: Vec<(PathBuf, FileKind)> = FileKind::INDEXED
            .iter()
            .flat_map(|kind| self.structure.index.records(*kind))
            .filter(|f| f.path.starts_with(dir) && f.path != dir)
            .map(|f| (f.path.clone(), f.kind()))
            .collect();
        if doomed.is_empty() {
            return None;
        }

        let structure = Arc::make_mut(&mut self.structure);
        for (path, kind) in &doomed {
            structure.index.remove(path, *kind);
        }
        self.rebuild();

        debug!("Removed {} records under {}", doomed.len(), dir.display());
        Some(Change::Removed {
            paths: doomed.into_iter().map(|(p, _)| p).collect(),
        })
    }

    fn manifest_changed(&mut self, path: &Path) -> Change {
        info!("Pack layout changed at {}, rescanning", path.display());
        Change::Rescanned {
            summary: self.scan(),
        }
    }

    /// Recomputes the graph from the current index.
    pub fn rebuild(&mut self) {
        self.graph = Arc::new(ReferenceGraph::build(&self.structure.index));
        self.generation += 1;
    }

    fn packs(&self) -> impl Iterator<Item = &PathBuf> {
        self.structure
            .resource_packs
            .iter()
            .chain(&self.structure.behavior_packs)
    }

    /// Whether a full scan would have walked `path`.
    fn is_tracked(&self, path: &Path) -> bool {
        self.structure.pack_of(path).is_some_and(|(root, _)| {
            path.strip_prefix(root)
                .map(|rel| !self.options.excludes(rel))
                .unwrap_or(false)
        })
    }

    pub fn file_kind(&self, path: &Path) -> FileKind {
        self.snapshot().file_kind(path)
    }

    pub fn uses_of(&self, path: &Path) -> Option<&UsageMap> {
        self.graph.uses_of(path)
    }

    pub fn used_by(&self, kind: FileKind, identifier: &str) -> &[AddonFile] {
        self.graph.used_by(kind, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn project() -> (TempDir, Workspace) {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "RP/manifest.json",
            r#"{ "modules": [ { "type": "resources" } ] }"#,
        );
        write(
            dir.path(),
            "RP/animations/cow.json",
            r#"{ "animations": { "anim.walk": {} } }"#,
        );
        let mut workspace = Workspace::new(vec![dir.path().to_path_buf()], IndexOptions::default());
        workspace.scan();
        (dir, workspace)
    }

    #[test]
    fn test_generation_advances_per_mutation() {
        let (dir, mut workspace) = project();
        assert_eq!(workspace.generation(), 1);

        let path = write(
            dir.path(),
            "RP/models/cow.json",
            r#"{ "minecraft:geometry": [ { "description": { "identifier": "geometry.cow" } } ] }"#,
        );
        let change = workspace.apply_create_or_change(&path).unwrap();
        assert_eq!(
            change,
            Change::Indexed {
                path: path.clone(),
                kind: FileKind::Model
            }
        );
        assert_eq!(workspace.generation(), 2);
        assert_eq!(workspace.file_kind(&path), FileKind::Model);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutations() {
        let (dir, mut workspace) = project();
        let before = workspace.snapshot();

        let path = dir.path().join("RP/animations/cow.json");
        fs::remove_file(&path).unwrap();
        workspace.apply_delete(&path, FileKind::Animation).unwrap();

        assert_eq!(before.structure.index.get(FileKind::Animation, "anim.walk").len(), 1);
        assert!(workspace.structure().index.get(FileKind::Animation, "anim.walk").is_empty());
        assert!(workspace.snapshot().generation > before.generation);
    }

    #[test]
    fn test_failed_change_keeps_previous_record() {
        let (dir, mut workspace) = project();
        let path = write(dir.path(), "RP/animations/cow.json", "{ broken");

        assert_eq!(workspace.apply_create_or_change(&path), None);
        let kept = workspace.structure().index.get(FileKind::Animation, "anim.walk");
        assert_eq!(kept.len(), 1);
        assert_eq!(workspace.generation(), 1);
    }

    #[test]
    fn test_files_outside_packs_are_ignored() {
        let (dir, mut workspace) = project();
        let path = write(
            dir.path(),
            "scratch/animations/x.json",
            r#"{ "animations": { "anim.x": {} } }"#,
        );
        assert_eq!(workspace.apply_create_or_change(&path), None);

        let hidden = write(
            dir.path(),
            "RP/node_modules/animations/y.json",
            r#"{ "animations": { "anim.y": {} } }"#,
        );
        assert_eq!(workspace.apply_create_or_change(&hidden), None);
        assert!(workspace.structure().index.get(FileKind::Animation, "anim.y").is_empty());
    }

    #[test]
    fn test_delete_path_resolves_kind() {
        let (dir, mut workspace) = project();
        let path = dir.path().join("RP/animations/cow.json");
        fs::remove_file(&path).unwrap();

        let change = workspace.apply_delete_path(&path).unwrap();
        assert_eq!(change, Change::Removed { paths: vec![path.clone()] });
        assert!(workspace.structure().index.find(&path).is_none());
        assert_eq!(workspace.apply_delete_path(&path), None);
    }

    #[test]
    fn test_deleting_a_directory_removes_its_records() {
        let (dir, mut workspace) = project();
        write(
            dir.path(),
            "RP/animations/sub/pig.json",
            r#"{ "animations": { "anim.oink": {} } }"#,
        );
        workspace.scan();
        fs::remove_dir_all(dir.path().join("RP/animations")).unwrap();

        let Some(Change::Removed { paths }) =
            workspace.apply_delete_path(&dir.path().join("RP/animations"))
        else {
            panic!("expected removal");
        };
        assert_eq!(paths.len(), 2);
        assert!(workspace.structure().index.is_empty());
    }

    #[test]
    fn test_manifest_change_rescans() {
        let (dir, mut workspace) = project();
        write(
            dir.path(),
            "BP/manifest.json",
            r#"{ "modules": [ { "type": "data" } ] }"#,
        );
        let path = write(
            dir.path(),
            "BP/items/apple.json",
            r#"{ "minecraft:item": { "description": { "identifier": "my:apple" } } }"#,
        );
        // Not yet a known pack.
        assert_eq!(workspace.apply_create_or_change(&path), None);

        let change = workspace
            .apply_create_or_change(&dir.path().join("BP/manifest.json"))
            .unwrap();
        assert!(matches!(change, Change::Rescanned { .. }));
        assert_eq!(workspace.structure().behavior_packs.len(), 1);
        assert_eq!(workspace.structure().index.get(FileKind::Item, "my:apple").len(), 1);
    }

    #[test]
    fn test_rescan_with_new_roots() {
        let (_dir, mut workspace) = project();
        let other = tempdir().unwrap();
        let summary = workspace.rescan(Some(vec![other.path().to_path_buf()]));

        assert_eq!(summary.resource_packs, 0);
        assert_eq!(workspace.roots(), &[other.path().to_path_buf()]);
        assert!(workspace.structure().index.is_empty());
    }
}
