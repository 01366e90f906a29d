//! Texture identifiers.
//!
//! Textures have no content we care about. A texture's identifier is its
//! path below the `textures` directory with the extension stripped, so
//! `rp/textures/entity/cow/body.png` is `entity/cow/body`.

use crate::record::FileData;
use std::path::{Component, Path};

const ANCHOR: &str = "textures";

pub(super) fn extract(path: &Path) -> Option<FileData> {
    texture_identifier(path).map(|texture| FileData::Texture { texture })
}

/// Derives a texture identifier from a file path.
///
/// Uses the last `textures` segment as the anchor so a project that
/// itself lives under a directory named `textures` still resolves.
/// Returns None when there is no anchor or nothing follows it.
pub fn texture_identifier(path: &Path) -> Option<String> {
    let segments: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    let anchor = segments.iter().rposition(|s| *s == ANCHOR)?;
    let rest = &segments[anchor + 1..];
    let (file, dirs) = rest.split_last()?;

    let stem = match file.rfind('.') {
        Some(0) | None => *file,
        Some(dot) => &file[..dot],
    };

    let mut id = dirs.join("/");
    if !id.is_empty() {
        id.push('/');
    }
    id.push_str(stem);
    Some(id)
}

/// Normalizes a texture reference written inside another file.
///
/// Entities and particles usually spell textures as `textures/entity/cow`,
/// sometimes with backslashes or an extension. This maps them onto the
/// same key texture files are indexed under.
pub fn normalize_texture_reference(reference: &str) -> String {
    let unified = reference.replace('\\', "/");
    let trimmed = unified.trim_start_matches("./");
    let relative = trimmed.strip_prefix("textures/").unwrap_or(trimmed);

    let last_slash = relative.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &relative[last_slash..];
    match name.rfind('.') {
        Some(dot) if dot > 0 && is_image_extension(&name[dot + 1..]) => {
            relative[..last_slash + dot].to_string()
        }
        _ => relative.to_string(),
    }
}

fn is_image_extension(ext: &str) -> bool {
    crate::classify::TEXTURE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_strips_anchor_and_extension() {
        assert_eq!(
            texture_identifier(Path::new("/work/rp/textures/entity/cow/body.png")),
            Some("entity/cow/body".to_string())
        );
        assert_eq!(
            texture_identifier(Path::new("rp/textures/stone.tga")),
            Some("stone".to_string())
        );
    }

    #[test]
    fn test_identifier_uses_last_anchor() {
        assert_eq!(
            texture_identifier(Path::new("/home/textures/rp/textures/blocks/dirt.png")),
            Some("blocks/dirt".to_string())
        );
    }

    #[test]
    fn test_identifier_without_anchor_fails() {
        assert_eq!(texture_identifier(Path::new("rp/images/cow.png")), None);
        assert_eq!(texture_identifier(Path::new("rp/textures")), None);
    }

    #[test]
    fn test_normalize_reference() {
        assert_eq!(
            normalize_texture_reference("textures/entity/cow/body"),
            "entity/cow/body"
        );
        assert_eq!(
            normalize_texture_reference("textures\\particle\\spark.png"),
            "particle/spark"
        );
        assert_eq!(normalize_texture_reference("entity/cow"), "entity/cow");
        // Dots that aren't image extensions survive.
        assert_eq!(
            normalize_texture_reference("textures/entity/cow.v2"),
            "entity/cow.v2"
        );
    }
}
