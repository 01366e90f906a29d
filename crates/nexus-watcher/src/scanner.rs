//! Full workspace scans.
//!
//! A scan starts from nothing: it finds the packs under each root, walks
//! every pack, and classifies and extracts each content file into a fresh
//! [`AddonStructure`]. Failures are per file and never stop the scan.

use crate::config::IndexOptions;
use crate::walk::{find_manifests, PackWalker};
use nexus_core::{classify, extract_file, read_pack_type, AddonFile, IndexError};
use nexus_graph::AddonStructure;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub resource_packs: usize,
    pub behavior_packs: usize,

    /// Files that produced a record.
    pub files_indexed: usize,

    /// Files that were walked but produced nothing: unknown kinds,
    /// manifests, and schema misses.
    pub files_skipped: usize,

    /// Files or manifests that couldn't be read or parsed.
    pub errors: Vec<(PathBuf, String)>,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Scans `roots` into a new structure.
///
/// # Example
///
/// ```no_run
/// use nexus_watcher::{scan, IndexOptions};
/// use std::path::PathBuf;
///
/// let (structure, summary) = scan(&[PathBuf::from(".")], &IndexOptions::default());
/// println!("{} files in {} packs", summary.files_indexed, structure.pack_count());
/// ```
pub fn scan(roots: &[PathBuf], options: &IndexOptions) -> (AddonStructure, ScanSummary) {
    let start = Instant::now();
    let mut structure = AddonStructure::new();
    let mut summary = ScanSummary::default();

    for root in roots {
        info!("Scanning {}", root.display());
        discover_packs(root, options, &mut structure, &mut summary);
    }

    let packs: Vec<PathBuf> = structure
        .resource_packs
        .iter()
        .chain(&structure.behavior_packs)
        .cloned()
        .collect();
    for pack in &packs {
        // Packs inside this one are indexed by their own walk.
        let nested = packs
            .iter()
            .filter(|other| *other != pack && other.starts_with(pack))
            .cloned();
        let walker = PackWalker::new(pack, options).skipping(nested);
        index_pack(&walker, &mut structure, &mut summary);
    }

    summary.resource_packs = structure.resource_packs.len();
    summary.behavior_packs = structure.behavior_packs.len();
    summary.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Indexed {} files in {} resource and {} behavior packs ({} skipped, {} errors) in {}ms",
        summary.files_indexed,
        summary.resource_packs,
        summary.behavior_packs,
        summary.files_skipped,
        summary.errors.len(),
        summary.duration_ms
    );

    (structure, summary)
}

/// Registers every pack under `root` whose manifest names a side.
fn discover_packs(
    root: &Path,
    options: &IndexOptions,
    structure: &mut AddonStructure,
    summary: &mut ScanSummary,
) {
    for manifest in find_manifests(root, options) {
        let Some(dir) = manifest.parent() else {
            continue;
        };
        match read_pack_type(&manifest) {
            Ok(pack_type) => {
                debug!("Found {} pack at {}", pack_type, dir.display());
                structure.add_pack(dir.to_path_buf(), pack_type);
            }
            Err(e) => {
                warn!("Excluding pack: {}", e);
                summary.errors.push((manifest.clone(), e.to_string()));
            }
        }
    }
}

fn index_pack(walker: &PackWalker, structure: &mut AddonStructure, summary: &mut ScanSummary) {
    for path in walker {
        match read_record(&path) {
            Ok(Some(file)) => {
                summary.files_indexed += 1;
                structure.index.upsert(file);
            }
            Ok(None) => summary.files_skipped += 1,
            Err(e) if e.is_unreadable() => {
                warn!("Skipping unreadable file: {}", e);
                summary.errors.push((path, e.to_string()));
            }
            Err(e) => {
                debug!("Skipping {}", e);
                summary.files_skipped += 1;
            }
        }
    }
}

/// Classifies and extracts one file.
///
/// `Ok(None)` means the file isn't something the index holds.
pub fn read_record(path: &Path) -> Result<Option<AddonFile>, IndexError> {
    let kind = classify(path);
    if !kind.is_indexed() {
        return Ok(None);
    }
    extract_file(path, kind).map(Some)
}
