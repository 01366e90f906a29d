//! Per-kind usage extraction.
//!
//! A usage extractor looks at one record and resolves the identifiers it
//! names against the index, producing `kind -> identifier -> [records]`.
//! Identifiers that resolve to nothing stay in the map with an empty list
//! so dangling references remain visible.

use crate::store::{AddonIndex, KindMap};
use nexus_core::{AddonFile, FileData, FileKind};

/// Forward edges of a single file.
pub type UsageMap = KindMap;

/// Resolves what `file` uses.
///
/// `None` means the kind declares no usage extractor at all. Terminal
/// kinds declare one that never finds anything and yield an empty map.
pub fn find_uses(index: &AddonIndex, file: &AddonFile) -> Option<UsageMap> {
    let mut uses = UsageMap::new();

    match &file.data {
        FileData::ServerBlock { block } => {
            resolve(index, &mut uses, FileKind::ClientBlock, [block.as_str()]);
        }
        FileData::ClientBlock { blocks } => {
            resolve(
                index,
                &mut uses,
                FileKind::ServerBlock,
                blocks.iter().map(String::as_str),
            );
        }
        FileData::ClientEntity { references, .. } => {
            for (kind, ids) in references.by_kind() {
                resolve(index, &mut uses, kind, ids.iter().map(String::as_str));
            }
        }
        FileData::Particle { texture, .. } => {
            resolve(index, &mut uses, FileKind::Texture, texture.as_deref());
        }
        FileData::Animation { .. }
        | FileData::Model { .. }
        | FileData::Texture { .. }
        | FileData::Sound { .. }
        | FileData::RenderController { .. } => {}
        FileData::ServerEntity { .. }
        | FileData::Item { .. }
        | FileData::Ui { .. }
        | FileData::Attachable { .. }
        | FileData::AnimationController { .. }
        | FileData::Fog { .. } => return None,
    }

    Some(uses)
}

/// Whether records of `kind` take part in the forward graph.
pub fn has_usage_extractor(kind: FileKind) -> bool {
    matches!(
        kind,
        FileKind::ServerBlock
            | FileKind::ClientBlock
            | FileKind::ClientEntity
            | FileKind::Particle
            | FileKind::Animation
            | FileKind::Model
            | FileKind::Texture
            | FileKind::Sound
            | FileKind::RenderController
    )
}

fn resolve<'a>(
    index: &AddonIndex,
    uses: &mut UsageMap,
    kind: FileKind,
    ids: impl IntoIterator<Item = &'a str>,
) {
    for id in ids {
        let targets = index.get(kind, id).to_vec();
        uses.entry(kind).or_default().insert(id.to_string(), targets);
    }
}
