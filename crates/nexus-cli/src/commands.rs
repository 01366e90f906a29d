//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nexus_core::FileKind;
use nexus_graph::{FileInfo, IndexStats, RelatedFiles, UsageEntry};
use nexus_watcher::{
    Change, FileWatcher, IndexOptions, IndexService, ScanSummary, Update, Workspace,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Write a default config into a project.
pub fn init(path: &Path) -> Result<()> {
    let config_path = IndexOptions::config_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    IndexOptions::default().save(path)?;

    println!("{} Initialized Nexus in {}", "✓".green(), path.display());
    println!("  Run {} to index your packs", "nexus index".cyan());

    Ok(())
}

/// Canonical project root plus its options, with CLI flags on top.
fn load_project(path: &Path, follow_symlinks: bool) -> Result<(PathBuf, IndexOptions)> {
    let root = fs::canonicalize(path)
        .map_err(|e| format!("cannot open project root '{}': {}", path.display(), e))?;
    let mut options = IndexOptions::load(&root)?;
    if follow_symlinks {
        options.follow_symlinks = true;
    }
    Ok((root, options))
}

/// Scans a project, showing a spinner while it runs.
fn open_workspace(path: &Path, follow_symlinks: bool) -> Result<(Workspace, ScanSummary)> {
    let (root, options) = load_project(path, follow_symlinks)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Scanning packs...");

    let mut workspace = Workspace::new(vec![root], options);
    let summary = workspace.scan();

    spinner.finish_and_clear();
    Ok((workspace, summary))
}

/// Resolves a file argument the same way the scan root was resolved.
fn resolve_file(file: &Path) -> Result<PathBuf> {
    fs::canonicalize(file)
        .map_err(|e| format!("cannot open '{}': {}", file.display(), e).into())
}

/// Shortens a path for display by stripping the project root.
fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Scan a project and report what was found.
pub fn index(path: &Path, output: Option<&Path>, follow_symlinks: bool) -> Result<()> {
    println!("{}", "Indexing addon packs...".cyan());

    let (workspace, summary) = open_workspace(path, follow_symlinks)?;
    print_summary(&summary);

    if summary.resource_packs + summary.behavior_packs == 0 {
        eprintln!("\n{} No packs found. Check:", "⚠ Warning:".yellow());
        eprintln!("  - Each pack directory has a manifest.json");
        eprintln!("  - The manifest lists a module of type \"resources\" or \"data\"");
        eprintln!("  - The pack isn't inside an ignored or hidden directory");
    }

    if !summary.errors.is_empty() {
        let root = &workspace.roots()[0];
        println!("\n{} files with errors:", "⚠".yellow());
        for (file, error) in summary.errors.iter().take(5) {
            println!("  {} - {}", display_path(root, file).red(), error);
        }
        if summary.errors.len() > 5 {
            println!("  ... and {} more", summary.errors.len() - 5);
        }
    }

    if let Some(out_path) = output {
        export(&workspace, out_path)?;
    }

    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "{} Indexed {} files in {} resource and {} behavior packs in {}ms",
        "✓".green(),
        summary.files_indexed.to_string().cyan(),
        summary.resource_packs.to_string().cyan(),
        summary.behavior_packs.to_string().cyan(),
        summary.duration_ms
    );
}

fn export(workspace: &Workspace, path: &Path) -> Result<()> {
    let stats = IndexStats::collect(workspace.structure(), workspace.graph());
    let export = serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "stats": stats,
        "structure": workspace.structure(),
        "graph": workspace.graph(),
    });

    fs::write(path, serde_json::to_string_pretty(&export)?)?;
    println!("{} Exported to {}", "✓".green(), path.display());

    Ok(())
}

/// Print the kind of a file and the identifiers it defines.
pub fn kind(root: &Path, file: &Path, follow_symlinks: bool) -> Result<()> {
    let (workspace, _) = open_workspace(root, follow_symlinks)?;
    let file = resolve_file(file)?;
    let root = &workspace.roots()[0];

    let kind = workspace.file_kind(&file);
    println!(
        "{} {}",
        display_path(root, &file).cyan(),
        kind.to_string().yellow()
    );

    match workspace.structure().index.find(&file) {
        Some(record) => {
            for id in record.identifiers() {
                println!("  {}", id);
            }
        }
        None if kind.is_indexed() => {
            println!("  {}", "(not indexed: outside a pack or no identifier)".dimmed());
        }
        None => {}
    }

    Ok(())
}

/// Show a file's references in both directions.
pub fn uses(root: &Path, file: &Path, json: bool, follow_symlinks: bool) -> Result<()> {
    let (workspace, _) = open_workspace(root, follow_symlinks)?;
    let file = resolve_file(file)?;
    let root = &workspace.roots()[0];

    let Some(related) =
        RelatedFiles::collect(&workspace.structure().index, workspace.graph(), &file)
    else {
        return Err(format!("'{}' is not indexed", display_path(root, &file)).into());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&related)?);
        return Ok(());
    }

    println!(
        "{} {}",
        display_path(root, &related.file.path).cyan().bold(),
        related.file.kind.to_string().yellow()
    );

    println!("\n{}", "Uses".bold());
    print_entries(root, &related.uses, "(nothing)");

    println!("\n{}", "Used by".bold());
    print_entries(root, &related.used_by, "(nothing)");

    Ok(())
}

fn print_entries(root: &Path, entries: &[UsageEntry], empty: &str) {
    if entries.is_empty() {
        println!("  {}", empty.dimmed());
        return;
    }
    for entry in entries {
        let label = format!("{} {}", entry.kind, entry.identifier);
        if entry.is_dangling() {
            println!("  {} {}", label.red(), "(unresolved)".dimmed());
            continue;
        }
        println!("  {}", label.yellow());
        for file in &entry.files {
            println!("    {}", display_path(root, &file.path).dimmed());
        }
    }
}

/// List the files that reference one identifier.
pub fn used_by(root: &Path, kind: &str, identifier: &str, follow_symlinks: bool) -> Result<()> {
    let kind = FileKind::from_name(kind)
        .filter(FileKind::is_indexed)
        .ok_or_else(|| {
            let names: Vec<_> = FileKind::INDEXED.iter().map(FileKind::as_str).collect();
            format!("unknown kind '{}', expected one of: {}", kind, names.join(", "))
        })?;

    let (workspace, _) = open_workspace(root, follow_symlinks)?;
    let root = &workspace.roots()[0];

    let users: Vec<FileInfo> = workspace
        .used_by(kind, identifier)
        .iter()
        .map(FileInfo::from)
        .collect();

    if users.is_empty() {
        println!("Nothing references {} \"{}\"", kind, identifier);
        return Ok(());
    }

    println!("{} files reference {} \"{}\":\n", users.len(), kind, identifier);
    for user in users {
        println!(
            "  {} {}",
            user.kind.to_string().yellow(),
            display_path(root, &user.path).cyan()
        );
    }

    Ok(())
}

/// Show index status and statistics.
pub fn status(path: &Path, show_dangling: bool, follow_symlinks: bool) -> Result<()> {
    if !IndexOptions::config_path(path).exists() {
        println!("{} No Nexus config in this directory, using defaults", "ℹ".cyan());
        println!("  Run {} to create one", "nexus init".cyan());
        println!();
    }

    let (workspace, _) = open_workspace(path, follow_symlinks)?;
    let stats = IndexStats::collect(workspace.structure(), workspace.graph());

    println!("{}", "Nexus Status".cyan().bold());
    println!();
    println!("  {} {}", "Resource packs:".dimmed(), stats.resource_packs);
    println!("  {} {}", "Behavior packs:".dimmed(), stats.behavior_packs);
    println!("  {} {}", "Files indexed:".dimmed(), stats.files);
    println!("  {} {}", "Identifiers:".dimmed(), stats.identifiers);
    println!("  {} {}", "References:".dimmed(), stats.forward_edges);
    println!("  {} {}", "Unresolved:".dimmed(), stats.dangling);

    if !stats.files_by_kind.is_empty() {
        println!();
        for (kind, count) in &stats.files_by_kind {
            println!("  {:<22} {}", kind.to_string(), count);
        }
    }

    if show_dangling {
        let root = &workspace.roots()[0];
        let dangling = workspace.graph().dangling();
        println!();
        println!("{}", "Unresolved references".cyan().bold());
        if dangling.is_empty() {
            println!("  {}", "(none)".dimmed());
        }
        for (source, kind, id) in dangling.iter().take(50) {
            println!(
                "  {} {} {}",
                display_path(root, source).dimmed(),
                kind.to_string().yellow(),
                id
            );
        }
        if dangling.len() > 50 {
            println!("  ... and {} more", dangling.len() - 50);
        }
    }

    Ok(())
}

/// Index, then apply file changes until interrupted.
pub async fn watch(path: &Path, follow_symlinks: bool) -> Result<()> {
    let (root, options) = load_project(path, follow_symlinks)?;
    let roots = vec![root.clone()];

    let handle = IndexService::spawn(Workspace::new(roots.clone(), options.clone()));
    let summary = handle.scan().await?;
    print_summary(&summary);

    let display_root = root.clone();
    let _printer = handle.on_update(move |update, _| print_update(&display_root, update));

    let mut watcher = FileWatcher::new(&roots, &options)?;
    info!("Debouncing file events by {}ms", options.debounce_ms);
    println!("  Press {} to stop", "Ctrl+C".cyan());

    loop {
        tokio::select! {
            change = watcher.recv() => match change {
                Some(change) => {
                    debug!("Queueing change to {}", change.path().display());
                    handle.apply(change)?;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n{} Stopping", "✓".green());
                break;
            }
        }
    }

    Ok(())
}

fn print_update(root: &Path, update: &Update) {
    let generation = format!("#{}", update.generation).dimmed();
    match &update.change {
        Change::Rescanned { summary } => println!(
            "{} {} rescanned: {} files in {} packs",
            generation,
            "↻".cyan(),
            summary.files_indexed,
            summary.resource_packs + summary.behavior_packs
        ),
        Change::Indexed { path, kind } => println!(
            "{} {} {} ({})",
            generation,
            "✓".green(),
            display_path(root, path),
            kind.to_string().yellow()
        ),
        Change::Removed { paths } => {
            for path in paths {
                println!("{} {} {}", generation, "✗".red(), display_path(root, path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_display_path_strips_root() {
        let root = Path::new("/work/proj");
        assert_eq!(
            display_path(root, Path::new("/work/proj/RP/a.json")),
            Path::new("RP/a.json").display().to_string()
        );
        assert_eq!(display_path(root, Path::new("/elsewhere/b.json")), "/elsewhere/b.json");
    }

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempdir().unwrap();
        init(dir.path()).unwrap();
        let loaded = IndexOptions::load(dir.path()).unwrap();
        assert_eq!(loaded, IndexOptions::default());

        // Running again leaves the file alone.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_flag_overrides_config() {
        let dir = tempdir().unwrap();
        IndexOptions::default().save(dir.path()).unwrap();
        let (_, options) = load_project(dir.path(), true).unwrap();
        assert!(options.follow_symlinks);
    }
}
