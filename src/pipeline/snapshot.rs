//! Atomic publication of [`RankingSnapshot`]s.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::RankingSnapshot;

/// Shared slot holding the latest snapshot. The aggregator [`publish`](Self::publish)es a
/// fully built value; readers [`load`](Self::load) an `Arc` that stays valid after replacement.
#[derive(Clone, Default)]
pub struct SnapshotHandle {
    current: Arc<RwLock<Arc<RankingSnapshot>>>,
}

impl SnapshotHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> Arc<RankingSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn publish(&self, snapshot: RankingSnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }
}
