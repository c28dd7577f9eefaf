//! Pipeline components: discovery source, tokenize workers, ranking aggregator and their wiring.

pub mod aggregate;
pub mod cancel;
pub mod context;
pub mod discovery;
pub mod error_handler;
pub mod orchestrator;
pub mod snapshot;
pub mod tokenize;

pub use aggregate::{RankingAggregator, spawn_aggregator_thread};
pub use cancel::CancelToken;
pub use context::{PipelineChannels, PipelineHandles, PipelineTuning, create_pipeline_channels};
pub use discovery::{DiscoverySource, spawn_discovery_thread};
pub use error_handler::{FileError, join_all_stages, join_stage};
pub use orchestrator::{run_pipeline, setup_pipeline_tuning};
pub use snapshot::SnapshotHandle;
pub use tokenize::{spawn_tokenize_workers, tokenize_path};
