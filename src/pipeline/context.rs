//! Pipeline channels and handles: the queues between stages and the threads running them.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::TermFrequency;
use crate::types::RankingSnapshot;

use super::cancel::CancelToken;
use super::error_handler::join_all_stages;
use super::snapshot::SnapshotHandle;

/// Tuning resolved before start: worker count.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_workers: usize,
}

/// Channels for the pipeline. Discovery gets path_tx; workers get path_rx, tf_tx; aggregator gets tf_rx.
///
/// Both queues are unbounded: a burst of new files or a slow aggregator grows memory instead
/// of stalling upstream stages.
pub struct PipelineChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub tf_tx: Sender<TermFrequency>,
    pub tf_rx: Receiver<TermFrequency>,
}

pub fn create_pipeline_channels() -> PipelineChannels {
    let (path_tx, path_rx) = unbounded::<PathBuf>();
    let (tf_tx, tf_rx) = unbounded::<TermFrequency>();
    PipelineChannels {
        path_tx,
        path_rx,
        tf_tx,
        tf_rx,
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): read snapshots while running,
/// then [`shutdown`](Self::shutdown) to cancel and join every stage.
pub struct PipelineHandles {
    /// Canonical watched root.
    pub root: PathBuf,
    pub snapshot: SnapshotHandle,
    pub cancel: CancelToken,
    pub discovery_handle: JoinHandle<Result<()>>,
    pub worker_handles: Vec<JoinHandle<Result<()>>>,
    pub aggregator_handle: JoinHandle<Result<()>>,
}

impl PipelineHandles {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Latest published ranking.
    pub fn snapshot(&self) -> Arc<RankingSnapshot> {
        self.snapshot.load()
    }

    /// True once any stage thread has returned. Stages only return on cancellation or
    /// failure, so outside of shutdown this means the pipeline is broken.
    pub fn any_stage_finished(&self) -> bool {
        self.discovery_handle.is_finished()
            || self.aggregator_handle.is_finished()
            || self.worker_handles.iter().any(|h| h.is_finished())
    }

    /// Cancel every stage and join them. Returns the first stage failure, if any.
    pub fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        let stages = std::iter::once(("discovery".to_string(), self.discovery_handle))
            .chain(
                self.worker_handles
                    .into_iter()
                    .enumerate()
                    .map(|(i, h)| (format!("tokenize worker {i}"), h)),
            )
            .chain(std::iter::once((
                "aggregator".to_string(),
                self.aggregator_handle,
            )));
        join_all_stages(stages)
    }
}
