//! The identifier index.
//!
//! Records are stored as `kind -> identifier -> [records]`. A bucket may
//! hold several records because distinct files are allowed to define the
//! same identifier, but never two records from the same path.

use nexus_core::{AddonFile, FileKind, PackType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Records grouped by the identifier they define (or are referenced by).
pub type IdentifierMap = BTreeMap<String, Vec<AddonFile>>;

/// Identifier maps grouped by kind.
pub type KindMap = BTreeMap<FileKind, IdentifierMap>;

/// Multi-valued `(kind, identifier) -> records` index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonIndex {
    buckets: KindMap,
}

impl AddonIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `file.path`.
    ///
    /// The path is purged from every bucket of the record's kind first,
    /// so identifiers the previous version defined and this one doesn't
    /// are dropped rather than left pointing at stale content.
    pub fn upsert(&mut self, file: AddonFile) {
        let kind = file.kind();
        self.remove(&file.path, kind);

        let identifiers: BTreeSet<String> =
            file.identifiers().into_iter().map(str::to_string).collect();
        if identifiers.is_empty() {
            return;
        }

        let by_id = self.buckets.entry(kind).or_default();
        for id in identifiers {
            by_id.entry(id).or_default().push(file.clone());
        }
    }

    /// Deletes `path` from every bucket of `kind`, dropping buckets that
    /// become empty. Returns whether anything was removed.
    pub fn remove(&mut self, path: &Path, kind: FileKind) -> bool {
        let Some(by_id) = self.buckets.get_mut(&kind) else {
            return false;
        };

        let mut removed = false;
        by_id.retain(|_, files| {
            let before = files.len();
            files.retain(|f| !f.is_at(path));
            removed |= files.len() != before;
            !files.is_empty()
        });

        if by_id.is_empty() {
            self.buckets.remove(&kind);
        }
        removed
    }

    /// Records defining `identifier` in `kind`. Empty when there are none.
    pub fn get(&self, kind: FileKind, identifier: &str) -> &[AddonFile] {
        self.buckets
            .get(&kind)
            .and_then(|by_id| by_id.get(identifier))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The identifier buckets of one kind.
    pub fn kind(&self, kind: FileKind) -> Option<&IdentifierMap> {
        self.buckets.get(&kind)
    }

    /// Each record of `kind` once, ordered by path.
    ///
    /// A record that defines several identifiers sits in several buckets;
    /// this collapses those copies.
    pub fn records(&self, kind: FileKind) -> Vec<&AddonFile> {
        let mut by_path: BTreeMap<&Path, &AddonFile> = BTreeMap::new();
        if let Some(by_id) = self.buckets.get(&kind) {
            for file in by_id.values().flatten() {
                by_path.entry(file.path.as_path()).or_insert(file);
            }
        }
        by_path.into_values().collect()
    }

    /// Finds the record for a path without knowing its kind.
    pub fn find(&self, path: &Path) -> Option<&AddonFile> {
        self.buckets
            .values()
            .flat_map(|by_id| by_id.values().flatten())
            .find(|f| f.is_at(path))
    }

    /// Number of distinct files indexed.
    pub fn file_count(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|by_id| by_id.values().flatten())
            .map(|f| f.path.as_path())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Number of `(kind, identifier)` buckets.
    pub fn identifier_count(&self) -> usize {
        self.buckets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Kinds that currently have at least one bucket.
    pub fn kinds(&self) -> impl Iterator<Item = FileKind> + '_ {
        self.buckets.keys().copied()
    }
}

/// Everything known about a project: its packs and the identifier index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonStructure {
    pub resource_packs: Vec<PathBuf>,
    pub behavior_packs: Vec<PathBuf>,
    pub index: AddonIndex,
}

impl AddonStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pack directory. Registering the same one twice is a no-op.
    pub fn add_pack(&mut self, dir: PathBuf, pack_type: PackType) {
        let packs = match pack_type {
            PackType::Resource => &mut self.resource_packs,
            PackType::Behavior => &mut self.behavior_packs,
        };
        if !packs.contains(&dir) {
            packs.push(dir);
        }
    }

    /// Resource pack roots and behavior pack roots.
    pub fn all_packs(&self) -> (&[PathBuf], &[PathBuf]) {
        (&self.resource_packs, &self.behavior_packs)
    }

    /// The innermost pack containing `path`, if any.
    pub fn pack_of(&self, path: &Path) -> Option<(&Path, PackType)> {
        let resource = self
            .resource_packs
            .iter()
            .map(|p| (p.as_path(), PackType::Resource));
        let behavior = self
            .behavior_packs
            .iter()
            .map(|p| (p.as_path(), PackType::Behavior));

        resource
            .chain(behavior)
            .filter(|(root, _)| path.starts_with(root))
            .max_by_key(|(root, _)| root.components().count())
    }

    pub fn pack_count(&self) -> usize {
        self.resource_packs.len() + self.behavior_packs.len()
    }
}
