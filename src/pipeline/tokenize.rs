//! Tokenize workers: compete for paths on the shared path channel and emit one
//! [`TermFrequency`] per distinct bucket of each file.
//!
//! A crossbeam channel hands each message to exactly one receiver, so a path queued once is
//! processed by exactly one worker however many are running.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, select};
use log::{debug, error, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::tokenizer::Tokenizer;
use crate::types::TermFrequency;

use super::cancel::CancelToken;
use super::error_handler::FileError;

/// Tokenize one file. `Ok(None)` when the path is gone or not a regular file.
///
/// Records are built in full before returning, so a file failing halfway yields nothing.
pub fn tokenize_path(tokenizer: &Tokenizer, path: &Path) -> Result<Option<Vec<TermFrequency>>, FileError> {
    if !path.is_file() {
        return Ok(None);
    }
    let counts = tokenizer
        .count_file(path)
        .map_err(|e| FileError::discard(path, e))?;
    Ok(Some(counts.into_frequencies(path)))
}

/// Single tokenize worker: read paths from path_rx, send records on tf_tx.
///
/// Exits `Ok` when cancelled (checked between files) or when the path channel closes.
fn tokenize_worker_loop(
    id: usize,
    path_rx: Receiver<PathBuf>,
    tf_tx: Sender<TermFrequency>,
    tokenizer: Arc<Tokenizer>,
    cancel: CancelToken,
) -> Result<()> {
    let cancel_rx = cancel.receiver().clone();
    loop {
        // select! picks at random among ready arms; queued paths must not win over cancel.
        if cancel.is_cancelled() {
            debug!("tokenize[{id}]: cancelled");
            return Ok(());
        }
        let path = select! {
            recv(cancel_rx) -> _ => {
                debug!("tokenize[{id}]: cancelled");
                return Ok(());
            }
            recv(path_rx) -> msg => match msg {
                Ok(path) => path,
                Err(_) => {
                    debug!("tokenize[{id}]: path channel closed");
                    return Ok(());
                }
            },
        };
        if cancel.is_cancelled() {
            debug!("tokenize[{id}]: cancelled, dropping {}", path.display());
            return Ok(());
        }
        match process_path(&tokenizer, &path, &tf_tx) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                error!("tokenize[{id}]: {e}. The worker stops.");
                return Err(e.into());
            }
            Err(e) => warn!("{e}"),
        }
    }
}

fn process_path(tokenizer: &Tokenizer, path: &Path, tf_tx: &Sender<TermFrequency>) -> Result<(), FileError> {
    let Some(records) = tokenize_path(tokenizer, path)? else {
        debug!("tokenize: skipping {} (missing or not a regular file)", path.display());
        return Ok(());
    };
    debug!("tokenize: {} -> {} terms", path.display(), records.len());
    for tf in records {
        tf_tx
            .send(tf)
            .map_err(|_| FileError::unexpected(path, "term-frequency channel closed"))?;
    }
    Ok(())
}

/// Spawn `num_workers` tokenize workers. Caller must drop its own `tf_tx` afterwards so the
/// aggregator sees the channel close once every worker has exited.
pub fn spawn_tokenize_workers(
    path_rx: Receiver<PathBuf>,
    tf_tx: &Sender<TermFrequency>,
    tokenizer: Arc<Tokenizer>,
    cancel: &CancelToken,
    num_workers: usize,
) -> Vec<JoinHandle<Result<()>>> {
    (0..num_workers)
        .map(|id| {
            let path_rx = path_rx.clone();
            let tf_tx = tf_tx.clone();
            let tokenizer = Arc::clone(&tokenizer);
            let cancel = cancel.clone();
            thread::spawn(move || tokenize_worker_loop(id, path_rx, tf_tx, tokenizer, cancel))
        })
        .collect()
}
