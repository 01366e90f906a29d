//! Entity extractors.
//!
//! Server entities only define an identifier. Client entities are the
//! main composite kind: their description names the animations, models,
//! textures, particles, sounds and render controllers the entity uses,
//! mostly as short-name to identifier maps.

use super::{description_identifier, string_values};
use crate::classify::{CLIENT_ENTITY_KEY, SERVER_ENTITY_KEY};
use crate::extractors::texture::normalize_texture_reference;
use crate::record::{EntityReferences, FileData};
use serde_json::Value;

pub(super) fn server_entity(content: &Value) -> Option<FileData> {
    description_identifier(content, SERVER_ENTITY_KEY)
        .map(|entity| FileData::ServerEntity { entity })
}

pub(super) fn client_entity(content: &Value) -> Option<FileData> {
    let entity = description_identifier(content, CLIENT_ENTITY_KEY)?;
    let description = content.get(CLIENT_ENTITY_KEY)?.get("description")?;

    let references = EntityReferences {
        animations: string_values(description.get("animations")),
        geometries: string_values(description.get("geometry")),
        textures: string_values(description.get("textures"))
            .iter()
            .map(|t| normalize_texture_reference(t))
            .collect(),
        particles: string_values(description.get("particle_effects")),
        sounds: string_values(description.get("sound_effects")),
        render_controllers: normalize_render_controllers(description.get("render_controllers")),
    };

    Some(FileData::ClientEntity { entity, references })
}

/// Flattens a `render_controllers` list into identifiers.
///
/// Entries are either plain strings or single-key objects mapping the
/// controller to a condition (`{ "controller.render.x": "query.is_baby" }`).
/// Both forms yield the controller identifier; anything else is skipped.
pub fn normalize_render_controllers(value: Option<&Value>) -> Vec<String> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) => Some(id.clone()),
            Value::Object(map) if map.len() == 1 => map.keys().next().cloned(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_entity() {
        let content = json!({
            "minecraft:entity": { "description": { "identifier": "my:cow" } }
        });
        assert_eq!(
            server_entity(&content),
            Some(FileData::ServerEntity {
                entity: "my:cow".into()
            })
        );
        assert_eq!(server_entity(&json!({ "minecraft:entity": {} })), None);
    }

    #[test]
    fn test_client_entity_collects_references() {
        let content = json!({
            "format_version": "1.10.0",
            "minecraft:client_entity": {
                "description": {
                    "identifier": "my:cow",
                    "animations": { "walk": "anim.walk", "look": "anim.look_at_target" },
                    "geometry": { "default": "geometry.cow" },
                    "textures": { "default": "textures/entity/cow/body" },
                    "particle_effects": { "smoke": "my:smoke" },
                    "sound_effects": { "moo": "mob.cow.say" },
                    "render_controllers": [
                        "controller.render.cow",
                        { "controller.render.cow_baby": "query.is_baby" }
                    ]
                }
            }
        });

        let Some(FileData::ClientEntity { entity, references }) = client_entity(&content) else {
            panic!("expected client entity");
        };
        assert_eq!(entity, "my:cow");

        let mut animations = references.animations.clone();
        animations.sort();
        assert_eq!(animations, vec!["anim.look_at_target", "anim.walk"]);
        assert_eq!(references.geometries, vec!["geometry.cow"]);
        assert_eq!(references.textures, vec!["entity/cow/body"]);
        assert_eq!(references.particles, vec!["my:smoke"]);
        assert_eq!(references.sounds, vec!["mob.cow.say"]);
        assert_eq!(
            references.render_controllers,
            vec!["controller.render.cow", "controller.render.cow_baby"]
        );
    }

    #[test]
    fn test_client_entity_reference_lists_are_optional() {
        let content = json!({
            "minecraft:client_entity": { "description": { "identifier": "my:ghost" } }
        });
        let Some(FileData::ClientEntity { references, .. }) = client_entity(&content) else {
            panic!("expected client entity");
        };
        assert!(references.is_empty());
    }

    #[test]
    fn test_client_entity_requires_identifier() {
        let content = json!({
            "minecraft:client_entity": { "description": { "animations": {} } }
        });
        assert_eq!(client_entity(&content), None);
    }

    #[test]
    fn test_render_controllers_skip_odd_entries() {
        let value = json!([
            "controller.render.a",
            { "controller.render.b": "1.0", "extra": "0.0" },
            42,
            { "controller.render.c": "query.is_sheared" }
        ]);
        assert_eq!(
            normalize_render_controllers(Some(&value)),
            vec!["controller.render.a", "controller.render.c"]
        );
        assert!(normalize_render_controllers(Some(&json!("nope"))).is_empty());
        assert!(normalize_render_controllers(None).is_empty());
    }
}
