//! Nexus Core - file classification and identifier extraction
//!
//! This crate turns the files of an addon project into typed records.
//! A path is first classified into a `FileKind`, then the extractor for
//! that kind pulls out the identifiers the file defines and, for
//! composite kinds, the identifiers it references in other kinds.
//!
//! # Example
//!
//! ```no_run
//! use nexus_core::{classify, extract_file};
//! use std::path::Path;
//!
//! let path = Path::new("rp/entity/cow.entity.json");
//! let kind = classify(path);
//! let file = extract_file(path, kind).unwrap();
//! for id in file.identifiers() {
//!     println!("{}: {}", kind, id);
//! }
//! ```

pub mod classify;
pub mod error;
pub mod extractors;
pub mod manifest;
pub mod record;

pub use classify::{classify, classify_path, is_content_file, PathClass};
pub use error::{IndexError, Result};
pub use extractors::{extract, extract_file};
pub use manifest::{read_pack_type, PackType};
pub use record::{AddonFile, EntityReferences, FileData, FileKind};
