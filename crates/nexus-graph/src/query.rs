//! Query result types.
//!
//! These structs are flattened views over the index and the graph,
//! shaped for printing and JSON export.

use crate::builder::ReferenceGraph;
use crate::store::{AddonIndex, AddonStructure};
use crate::usage::UsageMap;
use nexus_core::{AddonFile, FileKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Basic information about an indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub kind: FileKind,
    pub identifiers: Vec<String>,
    pub last_modified: u64,
}

impl From<&AddonFile> for FileInfo {
    fn from(file: &AddonFile) -> Self {
        Self {
            path: file.path.clone(),
            kind: file.kind(),
            identifiers: file.identifiers().into_iter().map(str::to_string).collect(),
            last_modified: file.last_modified,
        }
    }
}

/// One identifier a file references, with what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub kind: FileKind,
    pub identifier: String,
    pub files: Vec<FileInfo>,
}

impl UsageEntry {
    pub fn is_dangling(&self) -> bool {
        self.files.is_empty()
    }
}

/// Flattens a usage map in kind then identifier order.
pub fn usage_entries(uses: &UsageMap) -> Vec<UsageEntry> {
    uses.iter()
        .flat_map(|(kind, by_id)| {
            by_id.iter().map(move |(id, files)| UsageEntry {
                kind: *kind,
                identifier: id.clone(),
                files: files.iter().map(FileInfo::from).collect(),
            })
        })
        .collect()
}

/// Everything a file points at and everything pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedFiles {
    pub file: FileInfo,

    /// Forward edges, dangling ones included.
    pub uses: Vec<UsageEntry>,

    /// For each identifier the file defines, the files that use it.
    pub used_by: Vec<UsageEntry>,
}

impl RelatedFiles {
    /// Collects both directions for `path`, or `None` if it isn't indexed.
    pub fn collect(index: &AddonIndex, graph: &ReferenceGraph, path: &Path) -> Option<Self> {
        let file = index.find(path)?;
        let kind = file.kind();

        let uses = graph.uses_of(path).map(usage_entries).unwrap_or_default();
        let used_by = file
            .identifiers()
            .into_iter()
            .filter_map(|id| {
                let users = graph.used_by(kind, id);
                (!users.is_empty()).then(|| UsageEntry {
                    kind,
                    identifier: id.to_string(),
                    files: users.iter().map(FileInfo::from).collect(),
                })
            })
            .collect();

        Some(Self {
            file: FileInfo::from(file),
            uses,
            used_by,
        })
    }
}

/// Summary counts for a structure and its graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub resource_packs: usize,
    pub behavior_packs: usize,
    pub files: usize,
    pub identifiers: usize,
    pub forward_edges: usize,
    pub backward_edges: usize,
    pub dangling: usize,
    pub files_by_kind: BTreeMap<FileKind, usize>,
}

impl IndexStats {
    pub fn collect(structure: &AddonStructure, graph: &ReferenceGraph) -> Self {
        let files_by_kind = structure
            .index
            .kinds()
            .map(|kind| (kind, structure.index.records(kind).len()))
            .collect();

        Self {
            resource_packs: structure.resource_packs.len(),
            behavior_packs: structure.behavior_packs.len(),
            files: structure.index.file_count(),
            identifiers: structure.index.identifier_count(),
            forward_edges: graph.forward_edge_count(),
            backward_edges: graph.backward_edge_count(),
            dangling: graph.dangling().len(),
            files_by_kind,
        }
    }
}
