//! Termrank: streaming TF-IDF ranking of the files under a watched directory.

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::{CancelToken, PipelineHandles, SnapshotHandle};

use log::debug;
use std::path::Path;

/// Result alias used by public termrank API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: start watching `root` with `opts` and return the running pipeline.
///
/// Read the ranking with [`PipelineHandles::snapshot`] as often as needed; it is refreshed by
/// the aggregator thread. Stop with [`PipelineHandles::shutdown`], which cancels and joins
/// every stage and returns the first stage failure.
///
/// ```ignore
/// let handles = termrank::watch_dir(Path::new("docs"), &WatchOpts::default())?;
/// std::thread::sleep(Duration::from_secs(2));
/// for (path, score) in &handles.snapshot().ranking {
///     println!("{} {score:.3}", path.display());
/// }
/// handles.shutdown()?;
/// ```
pub fn watch_dir(root: &Path, opts: &WatchOpts) -> Result<PipelineHandles> {
    watch_dir_with_cancel(root, opts, CancelToken::new())
}

/// Like [`watch_dir`], but stages stop when `cancel` is cancelled (e.g. from a Ctrl+C handler).
pub fn watch_dir_with_cancel(
    root: &Path,
    opts: &WatchOpts,
    cancel: CancelToken,
) -> Result<PipelineHandles> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    pipeline::run_pipeline(root, opts, cancel)
}

/// Tokenize worker count used when [`WatchOpts::num_workers`] is None:
/// `max(available threads - 1, 1)`.
pub fn default_worker_count() -> usize {
    utils::config::WorkerThreadLimits::current().workers()
}
