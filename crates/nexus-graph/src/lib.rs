//! Nexus Graph - identifier index and reference graph
//!
//! Records produced by `nexus-core` are stored in an [`AddonIndex`] keyed
//! by kind and identifier. The [`ReferenceGraph`] is derived from that
//! index: for every file with a usage extractor it resolves the
//! identifiers the file names into the records that define them, and
//! keeps the inverse so a target can answer who uses it.
//!
//! ```
//! use nexus_core::{AddonFile, FileData, FileKind};
//! use nexus_graph::{AddonIndex, ReferenceGraph};
//!
//! let mut index = AddonIndex::new();
//! index.upsert(AddonFile::new(
//!     "bp/blocks/stone.json",
//!     FileData::ServerBlock { block: "my:stone".into() },
//! ));
//! index.upsert(AddonFile::new(
//!     "rp/blocks.json",
//!     FileData::ClientBlock { blocks: vec!["my:stone".into()] },
//! ));
//!
//! let graph = ReferenceGraph::build(&index);
//! assert_eq!(graph.used_by(FileKind::ClientBlock, "my:stone").len(), 1);
//! ```

pub mod builder;
pub mod query;
pub mod store;
pub mod usage;

pub use builder::ReferenceGraph;
pub use query::{usage_entries, FileInfo, IndexStats, RelatedFiles, UsageEntry};
pub use store::{AddonIndex, AddonStructure, IdentifierMap, KindMap};
pub use usage::{find_uses, has_usage_extractor, UsageMap};
