//! Block extractors.
//!
//! Blocks are split across packs. The behavior pack defines each block in
//! its own file; the resource pack lists every block's appearance in one
//! `blocks.json`.

use super::{description_identifier, non_empty, object_keys};
use crate::record::FileData;
use serde_json::Value;

pub(super) fn server_block(content: &Value) -> Option<FileData> {
    description_identifier(content, "minecraft:block").map(|block| FileData::ServerBlock { block })
}

/// Every top-level key except `format_version` is a block identifier.
pub(super) fn client_block(content: &Value) -> Option<FileData> {
    non_empty(object_keys(Some(content))).map(|blocks| FileData::ClientBlock { blocks })
}
