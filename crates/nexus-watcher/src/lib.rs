//! Nexus Watcher - scanning, incremental updates and the index service
//!
//! This crate handles the file system side of things:
//! - Finding packs and walking their content files
//! - Full scans into an `AddonStructure` plus reference graph
//! - Applying single-file creates, changes and deletes
//! - A single-worker service that serializes all of the above
//! - Watching project roots for changes

mod config;
mod error;
mod scanner;
mod service;
mod walk;
mod watcher;
mod workspace;

pub use config::{IndexOptions, CONFIG_DIR, CONFIG_FILE};
pub use error::{Result, ServiceError};
pub use scanner::{read_record, scan, ScanSummary};
pub use service::{IndexHandle, IndexService, Update};
pub use walk::{find_manifests, PackFiles, PackWalker};
pub use watcher::{FileChange, FileWatcher};
pub use workspace::{Change, Snapshot, Workspace};
