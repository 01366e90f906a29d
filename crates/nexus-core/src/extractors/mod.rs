//! Per-kind identifier extractors.
//!
//! Each kind has its own submodule that knows where that kind keeps its
//! identifiers. Dispatch is a closed match over `FileKind`, so adding a
//! kind means the compiler points at every place that needs a rule.

mod assets;
mod blocks;
mod definitions;
mod entity;
mod texture;

use crate::classify::{load_json, modified_millis};
use crate::error::{IndexError, Result};
use crate::record::{AddonFile, FileData, FileKind};
use serde_json::Value;
use std::path::Path;

pub use entity::normalize_render_controllers;
pub use texture::{normalize_texture_reference, texture_identifier};

/// Whether extracting this kind needs the file's parsed content.
///
/// Textures are identified by their path alone.
pub fn needs_content(kind: FileKind) -> bool {
    kind.is_indexed() && kind != FileKind::Texture
}

/// Reads a file from disk and extracts its record.
///
/// # Example
///
/// ```no_run
/// use nexus_core::{extract_file, FileKind};
/// use std::path::Path;
///
/// let file = extract_file(Path::new("rp/animations/cow.json"), FileKind::Animation).unwrap();
/// println!("{:?}", file.identifiers());
/// ```
pub fn extract_file(path: &Path, kind: FileKind) -> Result<AddonFile> {
    let content = if needs_content(kind) {
        Some(load_json(path)?)
    } else {
        None
    };

    let data = extract(path, kind, content.as_ref())?;
    Ok(AddonFile::new(path, data).with_modified(modified_millis(path)))
}

/// Extracts the typed payload for a kind from already-parsed content.
///
/// Useful for testing or in-memory content. Content kinds given `None`
/// fail the same way a file missing its identifier does.
pub fn extract(path: &Path, kind: FileKind, content: Option<&Value>) -> Result<FileData> {
    let data = match kind {
        FileKind::Texture => texture::extract(path),
        FileKind::Manifest | FileKind::Unknown => {
            return Err(IndexError::UnknownKind(path.to_path_buf()))
        }
        _ => {
            let content = content.ok_or_else(|| IndexError::missing(path, kind))?;
            match kind {
                FileKind::ServerBlock => blocks::server_block(content),
                FileKind::ClientBlock => blocks::client_block(content),
                FileKind::ServerEntity => entity::server_entity(content),
                FileKind::ClientEntity => entity::client_entity(content),
                FileKind::Item => definitions::item(content),
                FileKind::Ui => definitions::ui(content),
                FileKind::Attachable => definitions::attachable(content),
                FileKind::Fog => definitions::fog(content),
                FileKind::Animation => assets::animation(content),
                FileKind::AnimationController => assets::animation_controller(content),
                FileKind::Model => assets::model(content),
                FileKind::Particle => assets::particle(content),
                FileKind::Sound => assets::sound(content),
                FileKind::RenderController => assets::render_controller(content),
                FileKind::Texture | FileKind::Manifest | FileKind::Unknown => None,
            }
        }
    };

    data.ok_or_else(|| IndexError::missing(path, kind))
}

/// Reads `content[root].description.identifier` as a non-empty string.
fn description_identifier(content: &Value, root: &str) -> Option<String> {
    content
        .get(root)?
        .get("description")?
        .get("identifier")?
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Keys of a JSON object, skipping `format_version`.
fn object_keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.keys()
                .filter(|key| key.as_str() != "format_version")
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// String values of a JSON object (a short-name to identifier map).
/// Non-string values are skipped.
fn string_values(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.values()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `Some(list)` unless the list is empty.
fn non_empty(list: Vec<String>) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}
