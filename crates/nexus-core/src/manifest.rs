//! Pack manifests.
//!
//! A pack is the directory holding a `manifest.json`. The manifest's
//! `modules` list decides which side the pack belongs to: a `resources`
//! module makes it a resource pack, a `data` module a behavior pack.

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Which side of an addon a pack belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    Resource,
    Behavior,
}

impl std::fmt::Display for PackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Behavior => write!(f, "behavior"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    modules: Vec<ManifestModule>,
}

#[derive(Debug, Deserialize)]
struct ManifestModule {
    // Any JSON value, so one odd module can't sink the whole manifest.
    #[serde(rename = "type", default)]
    module_type: Option<Value>,
}

/// Reads a manifest from disk and decides the pack type.
pub fn read_pack_type(path: &Path) -> Result<PackType> {
    let bytes = fs::read(path).map_err(|e| IndexError::io(path, e))?;
    pack_type_from_slice(path, &bytes)
}

/// Decides the pack type from raw manifest bytes.
///
/// The first module whose type is `resources` or `data` wins; modules of
/// other types (`script`, `skin_pack`, ...) are passed over.
pub fn pack_type_from_slice(path: &Path, bytes: &[u8]) -> Result<PackType> {
    let manifest: Manifest = serde_json::from_slice(bytes).map_err(|e| IndexError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    manifest
        .modules
        .iter()
        .find_map(|module| match module.module_type.as_ref().and_then(Value::as_str) {
            Some("resources") => Some(PackType::Resource),
            Some("data") => Some(PackType::Behavior),
            _ => None,
        })
        .ok_or_else(|| IndexError::InvalidManifest {
            path: path.to_path_buf(),
            reason: "no resources or data module".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_type(json: &str) -> Result<PackType> {
        pack_type_from_slice(Path::new("pack/manifest.json"), json.as_bytes())
    }

    #[test]
    fn test_resource_and_behavior() {
        let rp = r#"{ "format_version": 2, "modules": [ { "type": "resources", "uuid": "a" } ] }"#;
        assert_eq!(pack_type(rp).unwrap(), PackType::Resource);

        let bp = r#"{ "modules": [ { "type": "data" } ] }"#;
        assert_eq!(pack_type(bp).unwrap(), PackType::Behavior);
    }

    #[test]
    fn test_first_matching_module_wins() {
        let json = r#"{ "modules": [
            { "type": "script", "entry": "main.js" },
            { "type": "data" },
            { "type": "resources" }
        ] }"#;
        assert_eq!(pack_type(json).unwrap(), PackType::Behavior);
    }

    #[test]
    fn test_non_string_module_type_is_skipped() {
        let json = r#"{ "modules": [
            { "type": 5 },
            { "type": null },
            { "type": ["data"] },
            { "type": "resources" }
        ] }"#;
        assert_eq!(pack_type(json).unwrap(), PackType::Resource);
    }

    #[test]
    fn test_invalid_manifests() {
        assert!(matches!(
            pack_type("{ broken"),
            Err(IndexError::InvalidManifest { .. })
        ));
        assert!(matches!(
            pack_type(r#"{ "modules": [ { "type": "skin_pack" } ] }"#),
            Err(IndexError::InvalidManifest { .. })
        ));
        assert!(matches!(
            pack_type(r#"{ "header": {} }"#),
            Err(IndexError::InvalidManifest { .. })
        ));
    }
}
