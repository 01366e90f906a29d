//! The index service.
//!
//! One worker owns the [`Workspace`] and drains a command queue in
//! arrival order, so scans and file updates never overlap. After each
//! successful mutation it publishes the new [`Snapshot`] on a watch
//! channel and an [`Update`] on a broadcast channel. Readers never touch
//! the workspace directly; they read the latest published snapshot.

use crate::error::Result;
use crate::scanner::ScanSummary;
use crate::watcher::FileChange;
use crate::workspace::{Change, Snapshot, Workspace};
use nexus_core::{AddonFile, FileKind};
use nexus_graph::{AddonStructure, UsageMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the update broadcast. Slow subscribers see `Lagged`.
const UPDATE_CAPACITY: usize = 64;

/// Notification sent after every successful mutation.
///
/// `snapshot` is the state right after `change` was applied, so its
/// generation always equals `generation`.
#[derive(Debug, Clone)]
pub struct Update {
    pub generation: u64,
    pub change: Change,
    pub snapshot: Snapshot,
}

enum Command {
    Scan {
        roots: Option<Vec<PathBuf>>,
        reply: oneshot::Sender<ScanSummary>,
    },
    CreateOrChange(PathBuf),
    Delete {
        path: PathBuf,
        kind: Option<FileKind>,
    },
    Flush {
        reply: oneshot::Sender<u64>,
    },
}

/// Spawns the worker.
pub struct IndexService;

impl IndexService {
    /// Moves `workspace` onto a blocking worker thread and returns a
    /// handle to it. Must be called inside a tokio runtime.
    ///
    /// The worker stops once every handle is dropped.
    pub fn spawn(workspace: Workspace) -> IndexHandle {
        let (commands, queue) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(workspace.snapshot());
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);

        let worker = Worker {
            workspace,
            queue,
            snapshots,
            updates: updates.clone(),
        };
        tokio::task::spawn_blocking(move || worker.run());

        IndexHandle {
            commands,
            snapshots: snapshot_rx,
            updates,
        }
    }
}

struct Worker {
    workspace: Workspace,
    queue: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Snapshot>,
    updates: broadcast::Sender<Update>,
}

impl Worker {
    fn run(mut self) {
        info!("Index service started");
        while let Some(first) = self.queue.blocking_recv() {
            let mut batch = vec![first];
            while let Ok(next) = self.queue.try_recv() {
                batch.push(next);
            }
            self.run_batch(batch);
        }
        info!("Index service stopped");
    }

    /// Runs queued commands in order. A scan makes every file event
    /// queued before it redundant, so those are dropped and all pending
    /// scan requests are answered by the last scan.
    fn run_batch(&mut self, mut batch: Vec<Command>) {
        let last_scan = batch
            .iter()
            .rposition(|command| matches!(command, Command::Scan { .. }));

        if let Some(last) = last_scan {
            let mut roots = None;
            let mut replies = Vec::new();
            let mut flushes = Vec::new();
            let mut dropped = 0;

            for command in batch.drain(..=last) {
                match command {
                    Command::Scan {
                        roots: requested,
                        reply,
                    } => {
                        if requested.is_some() {
                            roots = requested;
                        }
                        replies.push(reply);
                    }
                    Command::Flush { reply } => flushes.push(reply),
                    Command::CreateOrChange(_) | Command::Delete { .. } => dropped += 1,
                }
            }
            if dropped > 0 {
                debug!("Scan supersedes {} queued file events", dropped);
            }

            let summary = self.workspace.rescan(roots);
            self.publish(Change::Rescanned {
                summary: summary.clone(),
            });
            for reply in replies {
                let _ = reply.send(summary.clone());
            }
            for reply in flushes {
                let _ = reply.send(self.workspace.generation());
            }
        }

        for command in batch {
            self.run_command(command);
        }
    }

    fn run_command(&mut self, command: Command) {
        let change = match command {
            Command::Scan { roots, reply } => {
                let summary = self.workspace.rescan(roots);
                let _ = reply.send(summary.clone());
                Some(Change::Rescanned { summary })
            }
            Command::CreateOrChange(path) => self.workspace.apply_create_or_change(&path),
            Command::Delete {
                path,
                kind: Some(kind),
            } => self.workspace.apply_delete(&path, kind),
            Command::Delete { path, kind: None } => self.workspace.apply_delete_path(&path),
            Command::Flush { reply } => {
                let _ = reply.send(self.workspace.generation());
                None
            }
        };

        if let Some(change) = change {
            self.publish(change);
        }
    }

    fn publish(&self, change: Change) {
        let snapshot = self.workspace.snapshot();
        self.snapshots.send_replace(snapshot.clone());
        // No subscribers is fine.
        let _ = self.updates.send(Update {
            generation: snapshot.generation,
            change,
            snapshot,
        });
    }
}

/// Cheap, cloneable access to a running service.
#[derive(Clone)]
pub struct IndexHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    updates: broadcast::Sender<Update>,
}

impl IndexHandle {
    /// Rescans the current roots and waits for the summary.
    pub async fn scan(&self) -> Result<ScanSummary> {
        self.request_scan(None).await
    }

    /// Switches to a new root set and rescans.
    pub async fn rescan(&self, roots: Vec<PathBuf>) -> Result<ScanSummary> {
        self.request_scan(Some(roots)).await
    }

    async fn request_scan(&self, roots: Option<Vec<PathBuf>>) -> Result<ScanSummary> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(Command::Scan { roots, reply })?;
        Ok(rx.await?)
    }

    /// Queues a created or modified file.
    pub fn apply_create_or_change(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.commands.send(Command::CreateOrChange(path.into()))?;
        Ok(())
    }

    /// Queues a deletion of a file of a known kind.
    pub fn apply_delete(&self, path: impl Into<PathBuf>, kind: FileKind) -> Result<()> {
        self.commands.send(Command::Delete {
            path: path.into(),
            kind: Some(kind),
        })?;
        Ok(())
    }

    /// Queues a deletion, letting the worker work out the kind.
    pub fn apply_delete_path(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.commands.send(Command::Delete {
            path: path.into(),
            kind: None,
        })?;
        Ok(())
    }

    /// Queues a change reported by the file watcher.
    pub fn apply(&self, change: FileChange) -> Result<()> {
        match change {
            FileChange::Changed(path) => self.apply_create_or_change(path),
            FileChange::Deleted(path) => self.apply_delete_path(path),
        }
    }

    /// Waits until everything queued so far has been applied and returns
    /// the generation at that point.
    pub async fn flush(&self) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(Command::Flush { reply })?;
        Ok(rx.await?)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that always holds the latest snapshot.
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn structure(&self) -> Arc<AddonStructure> {
        Arc::clone(&self.snapshots.borrow().structure)
    }

    pub fn file_kind(&self, path: &Path) -> FileKind {
        self.snapshot().file_kind(path)
    }

    pub fn uses_of(&self, path: &Path) -> Option<UsageMap> {
        self.snapshots.borrow().uses_of(path).cloned()
    }

    pub fn used_by(&self, kind: FileKind, identifier: &str) -> Vec<AddonFile> {
        self.snapshots.borrow().used_by(kind, identifier).to_vec()
    }

    /// Receives every update published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.updates.subscribe()
    }

    /// Calls `callback` with each update and the snapshot it produced,
    /// until the service stops.
    pub fn on_update<F>(&self, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut(&Update, &Snapshot) + Send + 'static,
    {
        let mut updates = self.subscribe();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(update) => callback(&update, &update.snapshot),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Update callback fell behind, {} updates skipped", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Whether the worker is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("generation", &self.snapshots.borrow().generation)
            .finish()
    }
}
