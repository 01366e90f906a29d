//! Single-identifier definitions: items, attachables, fogs and UI files.

use super::description_identifier;
use crate::record::FileData;
use serde_json::Value;

pub(super) fn item(content: &Value) -> Option<FileData> {
    description_identifier(content, "minecraft:item").map(|item| FileData::Item { item })
}

pub(super) fn attachable(content: &Value) -> Option<FileData> {
    description_identifier(content, "minecraft:attachable")
        .map(|attachable| FileData::Attachable { attachable })
}

pub(super) fn fog(content: &Value) -> Option<FileData> {
    description_identifier(content, "minecraft:fog_settings").map(|fog| FileData::Fog { fog })
}

/// UI files are identified by their `namespace`.
pub(super) fn ui(content: &Value) -> Option<FileData> {
    content
        .get("namespace")
        .and_then(Value::as_str)
        .filter(|ns| !ns.is_empty())
        .map(|ns| FileData::Ui {
            namespace: ns.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_and_attachable() {
        let item_json = json!({ "minecraft:item": { "description": { "identifier": "my:wand" } } });
        assert_eq!(
            item(&item_json),
            Some(FileData::Item {
                item: "my:wand".into()
            })
        );

        let attachable_json =
            json!({ "minecraft:attachable": { "description": { "identifier": "my:wand" } } });
        assert_eq!(
            attachable(&attachable_json),
            Some(FileData::Attachable {
                attachable: "my:wand".into()
            })
        );
    }

    #[test]
    fn test_fog() {
        let content = json!({
            "format_version": "1.16.100",
            "minecraft:fog_settings": { "description": { "identifier": "my:swamp_fog" } }
        });
        assert_eq!(
            fog(&content),
            Some(FileData::Fog {
                fog: "my:swamp_fog".into()
            })
        );
    }

    #[test]
    fn test_ui_namespace() {
        assert_eq!(
            ui(&json!({ "namespace": "hud", "root_panel": {} })),
            Some(FileData::Ui {
                namespace: "hud".into()
            })
        );
        assert_eq!(ui(&json!({ "root_panel": {} })), None);
        assert_eq!(ui(&json!({ "namespace": 3 })), None);
    }
}
