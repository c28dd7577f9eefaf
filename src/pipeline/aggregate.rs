//! Ranking aggregator: single writer of the term index, publisher of ranking snapshots.
//!
//! Records are buffered and folded in when the buffer is full or the ranking is older than
//! the poll timeout, whichever comes first. The check runs after every poll, including polls
//! that time out with nothing received.

use anyhow::{Result, bail};
use crossbeam_channel::{Receiver, select};
use log::{debug, error};
use std::thread::{self, JoinHandle};
use std::time::{Instant, SystemTime};

use crate::engine::ranking::{TermIndex, distinct_paths, score_paths, top_n_by_value};
use crate::types::{RankingOpts, RankingSnapshot, TermFrequency};

use super::cancel::CancelToken;
use super::snapshot::SnapshotHandle;

pub struct RankingAggregator {
    opts: RankingOpts,
    by_term: TermIndex,
    buffer: Vec<TermFrequency>,
    last_update: Instant,
    snapshot: SnapshotHandle,
}

impl RankingAggregator {
    pub fn new(opts: RankingOpts, snapshot: SnapshotHandle) -> Result<Self> {
        if opts.poll_timeout.is_zero() {
            bail!("poll timeout must be greater than zero");
        }
        if opts.max_buffer_size == 0 {
            bail!("max buffer size must be greater than zero");
        }
        Ok(Self {
            opts,
            by_term: TermIndex::new(),
            buffer: Vec::new(),
            last_update: Instant::now(),
            snapshot,
        })
    }

    pub fn snapshot_handle(&self) -> &SnapshotHandle {
        &self.snapshot
    }

    pub fn push(&mut self, tf: TermFrequency) {
        self.buffer.push(tf);
    }

    pub fn should_update(&self) -> bool {
        self.buffer.len() >= self.opts.max_buffer_size
            || self.last_update.elapsed() >= self.opts.poll_timeout
    }

    /// Fold the buffer into the index, rescore every path and publish a new snapshot.
    ///
    /// Nothing is published on error.
    pub fn recompute(&mut self) -> Result<()> {
        let buffered = self.buffer.len();
        for tf in self.buffer.drain(..) {
            self.by_term
                .entry(tf.term.clone())
                .or_default()
                .insert(tf.path.clone(), tf);
        }

        let total_paths = distinct_paths(&self.by_term);
        let scores = score_paths(&self.by_term, self.opts.idf_mode, total_paths);
        if let Some((path, score)) = scores.iter().find(|(_, s)| !s.is_finite()) {
            bail!("non-finite score {} for {}", score, path.display());
        }
        let ranking = top_n_by_value(scores, self.opts.ranking_size);

        self.snapshot.publish(RankingSnapshot {
            analyzed_path_count: total_paths as u64,
            last_updated: Some(SystemTime::now()),
            idf_mode: self.opts.idf_mode,
            ranking,
        });
        self.last_update = Instant::now();
        debug!(
            "aggregate: ranking updated from {} buffered records, {} distinct paths",
            buffered, total_paths
        );
        Ok(())
    }

    /// Poll `tf_rx` until cancelled or every sender is gone.
    ///
    /// On channel close, records still buffered are folded in before returning.
    pub fn run(mut self, tf_rx: Receiver<TermFrequency>, cancel: CancelToken) -> Result<()> {
        let cancel_rx = cancel.receiver().clone();
        loop {
            if cancel.is_cancelled() {
                debug!("aggregate: cancelled");
                return Ok(());
            }
            select! {
                recv(cancel_rx) -> _ => {
                    debug!("aggregate: cancelled");
                    return Ok(());
                }
                recv(tf_rx) -> msg => match msg {
                    Ok(tf) => self.push(tf),
                    Err(_) => {
                        debug!("aggregate: term-frequency channel closed");
                        return self.recompute().inspect_err(|e| error!("aggregate: {e:#}"));
                    }
                },
                default(self.opts.poll_timeout) => {}
            }
            if cancel.is_cancelled() {
                debug!("aggregate: cancelled");
                return Ok(());
            }
            if self.should_update() {
                self.recompute()
                    .inspect_err(|e| error!("aggregate: {e:#}"))?;
            }
        }
    }
}

pub fn spawn_aggregator_thread(
    aggregator: RankingAggregator,
    tf_rx: Receiver<TermFrequency>,
    cancel: CancelToken,
) -> JoinHandle<Result<()>> {
    thread::spawn(move || aggregator.run(tf_rx, cancel))
}
