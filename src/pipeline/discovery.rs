//! Discovery source: initial scan of the root plus creation events from the OS watcher.
//!
//! Every directory is registered non-recursively as it is visited, so a newly created
//! directory is scanned and registered in turn. When the watcher reports dropped events the
//! watcher is rebuilt and the whole tree rescanned, which may emit a path twice.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, select, unbounded};
use log::{debug, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::engine::tools::{check_root_and_canonicalize, is_eligible_file};

use super::cancel::CancelToken;

type WatchEvent = notify::Result<Event>;

/// Emits every eligible file under `root` (existing and new) into the path channel.
pub struct DiscoverySource {
    root: PathBuf,
    include_existing: bool,
    path_tx: Sender<PathBuf>,
    cancel: CancelToken,
    watcher: RecommendedWatcher,
    event_tx: Sender<WatchEvent>,
    event_rx: Receiver<WatchEvent>,
}

fn new_watcher(event_tx: Sender<WatchEvent>) -> Result<RecommendedWatcher> {
    notify::recommended_watcher(move |res: WatchEvent| {
        let _ = event_tx.send(res);
    })
    .context("create file watcher")
}

/// Paths that vanished between listing and registration are not worth failing over.
fn is_vanished(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::PathNotFound => true,
        notify::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}

impl DiscoverySource {
    /// Fails when `root` does not exist (configuration error) or the watcher cannot be created.
    pub fn new(
        root: &Path,
        include_existing: bool,
        path_tx: Sender<PathBuf>,
        cancel: CancelToken,
    ) -> Result<Self> {
        let root = check_root_and_canonicalize(root)?;
        let (event_tx, event_rx) = unbounded::<WatchEvent>();
        let watcher = new_watcher(event_tx.clone())?;
        Ok(Self {
            root,
            include_existing,
            path_tx,
            cancel,
            watcher,
            event_tx,
            event_rx,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan, then block on watcher events until cancelled. Returns `Ok` on cancellation or
    /// when nobody consumes paths anymore; `Err` when the watcher fails.
    pub fn run(mut self) -> Result<()> {
        info!("Watching {} for new files", self.root.display());
        let root = self.root.clone();
        if self.visit_dir(&root, self.include_existing)?.is_break() {
            return Ok(());
        }

        let cancel_rx = self.cancel.receiver().clone();
        let event_rx = self.event_rx.clone();
        loop {
            select! {
                recv(cancel_rx) -> _ => {
                    debug!("discovery: cancelled");
                    return Ok(());
                }
                recv(event_rx) -> msg => {
                    // We hold a sender ourselves, so the channel cannot disconnect.
                    let Ok(res) = msg else { return Ok(()) };
                    let event = res.context("file watcher failed")?;
                    if self.handle_event(event)?.is_break() {
                        debug!("discovery: path channel closed");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<ControlFlow<()>> {
        if event.need_rescan() {
            warn!("Watcher dropped events; re-registering and rescanning {}", self.root.display());
            self.watcher = new_watcher(self.event_tx.clone())?;
            let root = self.root.clone();
            return self.visit_dir(&root, true);
        }
        if !matches!(event.kind, EventKind::Create(_)) {
            return Ok(ControlFlow::Continue(()));
        }
        for path in event.paths {
            if self.process_new_entry(&path)?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn process_new_entry(&mut self, path: &Path) -> Result<ControlFlow<()>> {
        if path.is_dir() {
            debug!("discovery: new directory {}", path.display());
            return self.visit_dir(path, true);
        }
        Ok(self.emit_if_eligible(path))
    }

    /// Register every directory under `dir` (inclusive) and, when `emit_files`, emit its files.
    fn visit_dir(&mut self, dir: &Path, emit_files: bool) -> Result<ControlFlow<()>> {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                self.register(entry.path())?;
            } else if emit_files && self.emit_if_eligible(entry.path()).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn register(&mut self, dir: &Path) -> Result<()> {
        match self.watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!("discovery: watching {}", dir.display());
                Ok(())
            }
            Err(err) if is_vanished(&err) => {
                debug!("discovery: {} vanished before registration", dir.display());
                Ok(())
            }
            Err(err) => Err(err).with_context(|| format!("watch {}", dir.display())),
        }
    }

    fn emit_if_eligible(&self, path: &Path) -> ControlFlow<()> {
        if !is_eligible_file(path) {
            debug!("discovery: ignoring {}", path.display());
            return ControlFlow::Continue(());
        }
        debug!("discovery: new file {}", path.display());
        match self.path_tx.send(path.to_path_buf()) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }
}

pub fn spawn_discovery_thread(source: DiscoverySource) -> JoinHandle<Result<()>> {
    thread::spawn(move || source.run())
}
