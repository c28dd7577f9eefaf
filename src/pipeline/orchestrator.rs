use anyhow::Result;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::WatchOpts;
use crate::engine::tokenizer::Tokenizer;
use crate::pipeline;
use crate::utils::config::WorkerThreadLimits;

use super::aggregate::RankingAggregator;
use super::discovery::DiscoverySource;

/// Resolve worker count from opts, or from available parallelism minus the other stages.
pub fn setup_pipeline_tuning(opts: &WatchOpts) -> pipeline::PipelineTuning {
    let num_workers = opts
        .num_workers
        .filter(|&n| n > 0)
        .unwrap_or_else(|| WorkerThreadLimits::current().workers());
    pipeline::PipelineTuning { num_workers }
}

/// Start discovery → path channel → tokenize workers → term-frequency channel → aggregator.
///
/// Every configuration problem (missing root, bad pattern, unknown charset, zero timeout) is
/// reported here, before any thread starts. The caller reads snapshots from the returned
/// handles and must call [`PipelineHandles::shutdown`](pipeline::PipelineHandles::shutdown).
pub fn run_pipeline(
    root: &Path,
    opts: &WatchOpts,
    cancel: pipeline::CancelToken,
) -> Result<pipeline::PipelineHandles> {
    let tuning = setup_pipeline_tuning(opts);
    let tokenizer = Arc::new(Tokenizer::new(&opts.tokenize)?);
    let snapshot = pipeline::SnapshotHandle::new();
    let aggregator = RankingAggregator::new(opts.ranking.clone(), snapshot.clone())?;

    let channels = pipeline::create_pipeline_channels();
    let source = DiscoverySource::new(
        root,
        opts.include_existing,
        channels.path_tx,
        cancel.clone(),
    )?;
    let root = source.root().to_path_buf();
    debug!("{:#?}", tuning);
    info!(
        "Starting pipeline on {} with {} tokenize workers",
        root.display(),
        tuning.num_workers
    );

    let aggregator_handle =
        pipeline::spawn_aggregator_thread(aggregator, channels.tf_rx, cancel.clone());

    let worker_handles = pipeline::spawn_tokenize_workers(
        channels.path_rx,
        &channels.tf_tx,
        tokenizer,
        &cancel,
        tuning.num_workers,
    );

    // Dropping the last sender closes the channel once every worker has exited.
    drop(channels.tf_tx);

    let discovery_handle = pipeline::spawn_discovery_thread(source);

    Ok(pipeline::PipelineHandles {
        root,
        snapshot,
        cancel,
        discovery_handle,
        worker_handles,
        aggregator_handle,
    })
}
