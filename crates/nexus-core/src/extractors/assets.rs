//! Resource-pack asset extractors.
//!
//! Animations, controllers, models, particles, sounds and render
//! controllers. Most of these define several identifiers per file as the
//! keys of one top-level object.

use super::{description_identifier, non_empty, object_keys};
use crate::extractors::texture::normalize_texture_reference;
use crate::record::FileData;
use serde_json::Value;

pub(super) fn animation(content: &Value) -> Option<FileData> {
    non_empty(object_keys(content.get("animations")))
        .map(|animations| FileData::Animation { animations })
}

pub(super) fn animation_controller(content: &Value) -> Option<FileData> {
    non_empty(object_keys(content.get("animation_controllers")))
        .map(|controllers| FileData::AnimationController { controllers })
}

/// Geometry identifiers from either model format.
///
/// Current files list geometries under `minecraft:geometry`, each with a
/// `description.identifier`. Legacy files (format 1.8/1.10) use the
/// identifier itself as a top-level `geometry.*` key.
pub(super) fn model(content: &Value) -> Option<FileData> {
    let mut geometries: Vec<String> = content
        .get("minecraft:geometry")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|geo| geo.get("description")?.get("identifier")?.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if geometries.is_empty() {
        geometries = object_keys(Some(content))
            .into_iter()
            .filter(|key| key.starts_with("geometry."))
            .map(|key| match key.split_once(':') {
                // "geometry.cow:geometry.base" inherits from a parent; the
                // part before the colon is the identifier.
                Some((id, _parent)) => id.to_string(),
                None => key,
            })
            .collect();
    }

    non_empty(geometries).map(|geometries| FileData::Model { geometries })
}

/// A particle effect and the texture its renderer samples.
///
/// Reads `particle_effect.description` first and falls back to the older
/// flat `effect`/`textures` shape.
pub(super) fn particle(content: &Value) -> Option<FileData> {
    if let Some(particle) = description_identifier(content, "particle_effect") {
        let texture = content
            .get("particle_effect")
            .and_then(|p| p.get("description"))
            .and_then(|d| d.get("basic_render_parameters"))
            .and_then(|r| r.get("texture"))
            .and_then(Value::as_str)
            .map(normalize_texture_reference);
        return Some(FileData::Particle { particle, texture });
    }

    let particle = content
        .get("effect")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())?
        .to_string();
    let texture = match content.get("textures") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(list)) => list.iter().find_map(Value::as_str),
        _ => None,
    }
    .map(normalize_texture_reference);

    Some(FileData::Particle { particle, texture })
}

/// Sound event identifiers.
///
/// `sound_definitions` maps event names to their definitions. Older
/// files carry a `sounds` field holding a name, or a list of names and
/// `{ "name": ... }` objects.
pub(super) fn sound(content: &Value) -> Option<FileData> {
    let mut sounds = object_keys(content.get("sound_definitions"));

    if sounds.is_empty() {
        sounds = match content.get("sounds") {
            Some(Value::String(name)) => vec![name.clone()],
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(name) => Some(name.clone()),
                    other => other.get("name").and_then(Value::as_str).map(str::to_string),
                })
                .collect(),
            _ => Vec::new(),
        };
    }

    non_empty(sounds).map(|sounds| FileData::Sound { sounds })
}

pub(super) fn render_controller(content: &Value) -> Option<FileData> {
    non_empty(object_keys(content.get("render_controllers"))).map(|controllers| {
        FileData::RenderController {
            controllers,
            geometries: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
        }
    })
}
