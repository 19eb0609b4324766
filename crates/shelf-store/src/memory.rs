use std::sync::{Mutex, PoisonError};

use shelf_types::Snapshot;

use crate::error::StoreResult;
use crate::traits::SnapshotStore;

/// Keeps the last saved snapshot in memory. Data is lost when dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<Snapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            saved: Mutex::new(snapshot),
        }
    }
}

impl SnapshotStore for InMemoryStore {
    fn load(&self) -> StoreResult<Snapshot> {
        Ok(self
            .saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        Ok(())
    }
}
