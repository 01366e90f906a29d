//! File classification.
//!
//! Decides which kind a path belongs to. Almost every rule looks only at
//! the path: the file name, the directories above it, and the extension.
//! Entity files are the exception, since server and client entities share
//! directory names and have to be told apart by their top-level key.

use crate::error::{IndexError, Result};
use crate::record::FileKind;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Basename of a pack manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Basename of the resource-side block manifest.
pub const BLOCKS_FILE: &str = "blocks.json";

/// Image extensions a texture may have.
pub const TEXTURE_EXTENSIONS: &[&str] = &["png", "tga", "jpg", "jpeg"];

/// Extensions worth looking at during a scan.
pub const CONTENT_EXTENSIONS: &[&str] = &["json", "png", "tga", "jpg", "jpeg"];

/// Directory-driven rules, in priority order. Each maps a directory name
/// somewhere above the file to the kind of `.json` files beneath it.
const DIRECTORY_RULES: &[(&str, FileKind)] = &[
    ("items", FileKind::Item),
    ("animations", FileKind::Animation),
    ("animation_controllers", FileKind::AnimationController),
    ("models", FileKind::Model),
];

/// Rules that come after the texture rule.
const LATE_DIRECTORY_RULES: &[(&str, FileKind)] = &[
    ("particles", FileKind::Particle),
    ("sounds", FileKind::Sound),
    ("render_controllers", FileKind::RenderController),
    ("ui", FileKind::Ui),
    ("attachables", FileKind::Attachable),
    ("fogs", FileKind::Fog),
];

/// Directory names that hold entity definitions of either side.
const ENTITY_DIRS: &[&str] = &["entity", "entities"];

/// Top-level key of a behavior-side entity.
pub const SERVER_ENTITY_KEY: &str = "minecraft:entity";

/// Top-level key of a resource-side entity.
pub const CLIENT_ENTITY_KEY: &str = "minecraft:client_entity";

/// Result of the path-only rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// The path alone decides the kind.
    Known(FileKind),
    /// The file sits in an entity directory; its content decides.
    NeedsProbe,
}

/// Classifies a file, reading it only when the path is ambiguous.
///
/// Never fails: unreadable entity files come back as `Unknown` with a
/// warning logged.
pub fn classify(path: &Path) -> FileKind {
    match classify_path(path) {
        PathClass::Known(kind) => {
            if kind == FileKind::Unknown {
                debug!("Unknown file kind: {}", path.display());
            }
            kind
        }
        PathClass::NeedsProbe => match load_json(path) {
            Ok(content) => {
                let kind = probe_entity(&content);
                if kind == FileKind::Unknown {
                    debug!("No entity definition in {}", path.display());
                }
                kind
            }
            Err(e) => {
                warn!("Could not probe entity file: {}", e);
                FileKind::Unknown
            }
        },
    }
}

/// Applies the path-only rules in priority order.
pub fn classify_path(path: &Path) -> PathClass {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let extension = extension_of(path);
    let is_json = extension.as_deref() == Some("json");

    if file_name == MANIFEST_FILE {
        return PathClass::Known(FileKind::Manifest);
    }
    if is_json && in_block_directory(path) {
        return PathClass::Known(FileKind::ServerBlock);
    }
    if file_name == BLOCKS_FILE {
        return PathClass::Known(FileKind::ClientBlock);
    }
    if is_json {
        if let Some(kind) = match_directory_rules(path, DIRECTORY_RULES) {
            return PathClass::Known(kind);
        }
    }
    if in_directory(path, "textures")
        && extension
            .as_deref()
            .is_some_and(|ext| TEXTURE_EXTENSIONS.contains(&ext))
    {
        return PathClass::Known(FileKind::Texture);
    }
    if is_json {
        if let Some(kind) = match_directory_rules(path, LATE_DIRECTORY_RULES) {
            return PathClass::Known(kind);
        }
        if ENTITY_DIRS.iter().any(|dir| in_directory(path, dir)) {
            return PathClass::NeedsProbe;
        }
    }

    PathClass::Known(FileKind::Unknown)
}

/// Picks server or client entity from a parsed entity file.
pub fn probe_entity(content: &Value) -> FileKind {
    if content.get(SERVER_ENTITY_KEY).is_some() {
        FileKind::ServerEntity
    } else if content.get(CLIENT_ENTITY_KEY).is_some() {
        FileKind::ClientEntity
    } else {
        FileKind::Unknown
    }
}

/// Whether a path has an extension a scan should consider.
pub fn is_content_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| CONTENT_EXTENSIONS.contains(&ext.as_str()))
}

/// Reads and parses a JSON file.
pub fn load_json(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(|e| IndexError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| IndexError::json(path, e))
}

/// Modification time in milliseconds since the Unix epoch, or 0.
pub fn modified_millis(path: &Path) -> u64 {
    fs::metadata(path)
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True when `name` is one of the directories above the file.
fn in_directory(path: &Path, name: &str) -> bool {
    path.parent()
        .map(|parent| parent.iter().any(|segment| segment == name))
        .unwrap_or(false)
}

/// True when the file sits under a behavior-side `blocks` directory.
///
/// A `blocks` folder nested directly in another kind's directory, like
/// `models/blocks` or `textures/blocks`, only groups files of that kind.
fn in_block_directory(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    let segments: Vec<_> = parent.iter().collect();
    match segments.iter().rposition(|segment| *segment == "blocks") {
        Some(0) => true,
        Some(at) => !is_kind_directory(segments[at - 1]),
        None => false,
    }
}

fn is_kind_directory(segment: &std::ffi::OsStr) -> bool {
    DIRECTORY_RULES
        .iter()
        .chain(LATE_DIRECTORY_RULES)
        .map(|(dir, _)| *dir)
        .chain(ENTITY_DIRS.iter().copied())
        .chain(std::iter::once("textures"))
        .any(|dir| segment == dir)
}

fn match_directory_rules(path: &Path, rules: &[(&str, FileKind)]) -> Option<FileKind> {
    rules
        .iter()
        .find(|(dir, _)| in_directory(path, dir))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn kind_of(path: &str) -> PathClass {
        classify_path(Path::new(path))
    }

    #[test]
    fn test_path_rules() {
        use FileKind::*;
        let cases = [
            ("bp/manifest.json", Manifest),
            ("bp/blocks/stone.json", ServerBlock),
            ("rp/blocks.json", ClientBlock),
            ("bp/items/wand.json", Item),
            ("rp/animations/cow.animation.json", Animation),
            ("rp/animation_controllers/cow.json", AnimationController),
            ("rp/models/entity/cow.geo.json", Model),
            ("rp/models/blocks/lantern.geo.json", Model),
            ("bp/blocks/nature/stone.json", ServerBlock),
            ("rp/textures/entity/cow.png", Texture),
            ("rp/textures/blocks/stone.tga", Texture),
            ("rp/particles/spark.json", Particle),
            ("rp/sounds/sound_definitions.json", Sound),
            ("rp/render_controllers/cow.rc.json", RenderController),
            ("rp/ui/hud_screen.json", Ui),
            ("rp/attachables/bow.json", Attachable),
            ("rp/fogs/swamp.json", Fog),
            ("rp/texts/en_US.lang", Unknown),
        ];
        for (path, expected) in cases {
            assert_eq!(kind_of(path), PathClass::Known(expected), "{}", path);
        }
    }

    #[test]
    fn test_priority_order() {
        // A texture image inside a blocks folder is still a texture.
        assert_eq!(
            kind_of("rp/textures/blocks/stone.png"),
            PathClass::Known(FileKind::Texture)
        );
        // Only a pack-level blocks folder holds block definitions.
        assert_eq!(
            kind_of("/home/me/models/addon/BP/blocks/lamp.json"),
            PathClass::Known(FileKind::ServerBlock)
        );
        assert_eq!(
            kind_of("rp/textures/blocks/stone.json"),
            PathClass::Known(FileKind::Unknown)
        );
        // Model rule wins over the entity probe.
        assert_eq!(
            kind_of("rp/models/entity/cow.json"),
            PathClass::Known(FileKind::Model)
        );
        // A JSON file under textures isn't an image.
        assert_eq!(
            kind_of("rp/textures/terrain_texture.json"),
            PathClass::Known(FileKind::Unknown)
        );
        // Matching is on whole segments, not substrings.
        assert_eq!(
            kind_of("rp/my_animations/cow.json"),
            PathClass::Known(FileKind::Unknown)
        );
    }

    #[test]
    fn test_entity_dirs_need_probe() {
        assert_eq!(kind_of("bp/entities/cow.json"), PathClass::NeedsProbe);
        assert_eq!(kind_of("rp/entity/cow.entity.json"), PathClass::NeedsProbe);
        assert_eq!(
            kind_of("rp/entity/readme.txt"),
            PathClass::Known(FileKind::Unknown)
        );
    }

    #[test]
    fn test_probe_entity() {
        assert_eq!(
            probe_entity(&json!({ "minecraft:entity": {} })),
            FileKind::ServerEntity
        );
        assert_eq!(
            probe_entity(&json!({ "minecraft:client_entity": {} })),
            FileKind::ClientEntity
        );
        assert_eq!(probe_entity(&json!({ "other": 1 })), FileKind::Unknown);
    }

    #[test]
    fn test_classify_reads_entity_files() {
        let dir = tempdir().unwrap();
        let entities = dir.path().join("entities");
        fs::create_dir_all(&entities).unwrap();

        let server = entities.join("cow.json");
        fs::write(&server, r#"{ "minecraft:entity": { "description": {} } }"#).unwrap();
        assert_eq!(classify(&server), FileKind::ServerEntity);

        let broken = entities.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(classify(&broken), FileKind::Unknown);

        let missing = entities.join("missing.json");
        assert_eq!(classify(&missing), FileKind::Unknown);
    }

    #[test]
    fn test_is_content_file() {
        assert!(is_content_file(Path::new("a/b.json")));
        assert!(is_content_file(Path::new("a/b.PNG")));
        assert!(!is_content_file(Path::new("a/b.lang")));
        assert!(!is_content_file(Path::new("a/noext")));
    }
}
