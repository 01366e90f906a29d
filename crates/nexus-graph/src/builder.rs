//! Reference graph construction.
//!
//! The graph is derived data. It is never patched in place: every
//! structural change clears both directions and recomputes them from the
//! index, so `used_by` is always the transpose of `uses_of`.

use crate::store::AddonIndex;
use crate::usage::{find_uses, has_usage_extractor, UsageMap};
use nexus_core::{AddonFile, FileKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Forward and backward identifier-level edges between files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceGraph {
    /// Source path to what it uses.
    uses_of: BTreeMap<PathBuf, UsageMap>,

    /// Target kind and identifier to the files that use it.
    used_by: UsageMap,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh graph from the index.
    pub fn build(index: &AddonIndex) -> Self {
        let mut graph = Self::new();
        graph.rebuild(index);
        graph
    }

    /// Discards both maps and recomputes them from `index`.
    ///
    /// Only identifiers that resolved to at least one record produce a
    /// backward edge; dangling references live in `uses_of` alone.
    pub fn rebuild(&mut self, index: &AddonIndex) {
        self.uses_of.clear();
        self.used_by.clear();

        for kind in FileKind::INDEXED {
            if !has_usage_extractor(kind) {
                continue;
            }
            for file in index.records(kind) {
                let Some(uses) = find_uses(index, file) else {
                    continue;
                };
                self.record_inverse(file, &uses);
                self.uses_of.insert(file.path.clone(), uses);
            }
        }

        debug!(
            "Rebuilt reference graph: {} sources, {} forward edges, {} backward edges",
            self.uses_of.len(),
            self.forward_edge_count(),
            self.backward_edge_count()
        );
    }

    fn record_inverse(&mut self, source: &AddonFile, uses: &UsageMap) {
        for (kind, by_id) in uses {
            for (id, targets) in by_id {
                if targets.is_empty() {
                    continue;
                }
                let users = self
                    .used_by
                    .entry(*kind)
                    .or_default()
                    .entry(id.clone())
                    .or_default();
                if !users.iter().any(|u| u.is_at(&source.path)) {
                    users.push(source.clone());
                }
            }
        }
    }

    /// What the file at `path` uses. `None` when the file has no usage
    /// extractor or isn't indexed.
    pub fn uses_of(&self, path: &Path) -> Option<&UsageMap> {
        self.uses_of.get(path)
    }

    /// Files that use `identifier` of `kind`.
    pub fn used_by(&self, kind: FileKind, identifier: &str) -> &[AddonFile] {
        self.used_by
            .get(&kind)
            .and_then(|by_id| by_id.get(identifier))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every source path with its forward edges.
    pub fn sources(&self) -> impl Iterator<Item = (&Path, &UsageMap)> {
        self.uses_of.iter().map(|(p, u)| (p.as_path(), u))
    }

    /// The whole backward map.
    pub fn used_by_map(&self) -> &UsageMap {
        &self.used_by
    }

    /// Whether any edge in either direction mentions `path`.
    pub fn mentions(&self, path: &Path) -> bool {
        let in_map = |map: &UsageMap| {
            map.values()
                .flat_map(|by_id| by_id.values().flatten())
                .any(|f| f.is_at(path))
        };
        self.uses_of.contains_key(path)
            || self.uses_of.values().any(in_map)
            || in_map(&self.used_by)
    }

    /// Number of resolved source-to-target record pairs.
    pub fn forward_edge_count(&self) -> usize {
        self.uses_of
            .values()
            .flat_map(|uses| uses.values().flat_map(|by_id| by_id.values()))
            .map(Vec::len)
            .sum()
    }

    /// Number of target-identifier-to-source pairs.
    pub fn backward_edge_count(&self) -> usize {
        self.used_by
            .values()
            .flat_map(|by_id| by_id.values())
            .map(Vec::len)
            .sum()
    }

    /// Identifiers referenced somewhere that resolve to nothing.
    pub fn dangling(&self) -> Vec<(&Path, FileKind, &str)> {
        let mut out = Vec::new();
        for (path, uses) in &self.uses_of {
            for (kind, by_id) in uses {
                for (id, targets) in by_id {
                    if targets.is_empty() {
                        out.push((path.as_path(), *kind, id.as_str()));
                    }
                }
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.uses_of.clear();
        self.used_by.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{EntityReferences, FileData};

    const ENTITY: &str = "rp/entity/cow.entity.json";
    const ANIMATION: &str = "rp/animations/cow.animation.json";

    fn scenario_a() -> (AddonIndex, AddonFile, AddonFile) {
        let entity = AddonFile::new(
            ENTITY,
            FileData::ClientEntity {
                entity: "my:cow".into(),
                references: EntityReferences {
                    animations: vec!["anim.walk".into()],
                    ..Default::default()
                },
            },
        );
        let animation = AddonFile::new(
            ANIMATION,
            FileData::Animation {
                animations: vec!["anim.walk".into(), "anim.idle".into()],
            },
        );
        let mut index = AddonIndex::new();
        index.upsert(entity.clone());
        index.upsert(animation.clone());
        (index, entity, animation)
    }

    #[test]
    fn test_entity_uses_animation() {
        let (index, entity, animation) = scenario_a();
        let graph = ReferenceGraph::build(&index);

        let uses = graph.uses_of(Path::new(ENTITY)).unwrap();
        assert_eq!(uses[&FileKind::Animation]["anim.walk"], vec![animation]);
        assert_eq!(graph.used_by(FileKind::Animation, "anim.walk"), &[entity]);
        assert!(graph.used_by(FileKind::Animation, "anim.idle").is_empty());
    }

    #[test]
    fn test_deleted_target_leaves_dangling_reference() {
        let (mut index, _, _) = scenario_a();
        index.remove(Path::new(ANIMATION), FileKind::Animation);
        let graph = ReferenceGraph::build(&index);

        assert!(graph.used_by(FileKind::Animation, "anim.walk").is_empty());
        let uses = graph.uses_of(Path::new(ENTITY)).unwrap();
        assert!(uses[&FileKind::Animation]["anim.walk"].is_empty());
        assert!(!graph.mentions(Path::new(ANIMATION)));
        assert_eq!(
            graph.dangling(),
            vec![(Path::new(ENTITY), FileKind::Animation, "anim.walk")]
        );
    }

    #[test]
    fn test_blocks_link_both_ways() {
        let server = AddonFile::new(
            "bp/blocks/stone.json",
            FileData::ServerBlock {
                block: "my:stone".into(),
            },
        );
        let client = AddonFile::new(
            "rp/blocks.json",
            FileData::ClientBlock {
                blocks: vec!["my:stone".into(), "my:dirt".into()],
            },
        );
        let mut index = AddonIndex::new();
        index.upsert(server.clone());
        index.upsert(client.clone());
        let graph = ReferenceGraph::build(&index);

        let forward = graph.uses_of(&server.path).unwrap();
        assert_eq!(forward[&FileKind::ClientBlock]["my:stone"], vec![client.clone()]);
        assert_eq!(graph.used_by(FileKind::ClientBlock, "my:stone"), &[server.clone()]);
        assert_eq!(graph.used_by(FileKind::ServerBlock, "my:stone"), &[client]);
        assert!(graph.used_by(FileKind::ServerBlock, "my:dirt").is_empty());
    }

    #[test]
    fn test_used_by_is_transpose_of_uses_of() {
        let (index, _, _) = scenario_a();
        let graph = ReferenceGraph::build(&index);

        for (source, uses) in graph.sources() {
            for (kind, by_id) in uses {
                for (id, targets) in by_id {
                    let users = graph.used_by(*kind, id);
                    assert_eq!(
                        !targets.is_empty(),
                        users.iter().any(|u| u.is_at(source))
                    );
                }
            }
        }
        for (kind, by_id) in graph.used_by_map() {
            for (id, users) in by_id {
                for user in users {
                    let uses = graph.uses_of(&user.path).unwrap();
                    assert!(!uses[kind][id].is_empty());
                }
            }
        }
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let (index, _, _) = scenario_a();
        let mut graph = ReferenceGraph::build(&index);
        let first = graph.clone();
        graph.rebuild(&index);
        assert_eq!(graph, first);
        assert_eq!(graph.forward_edge_count(), 1);
        assert_eq!(graph.backward_edge_count(), 1);
    }

    #[test]
    fn test_terminal_files_are_sources_without_edges() {
        let (index, _, _) = scenario_a();
        let graph = ReferenceGraph::build(&index);
        assert_eq!(graph.uses_of(Path::new(ANIMATION)), Some(&UsageMap::new()));
    }
}
