use std::sync::Arc;

use anyhow::Context;
use shelf_ledger::{FinePolicy, InMemoryLibrary, LedgerReader};
use shelf_store::SnapshotStore;
use shelf_types::Clock;

/// A library loaded from a store, to be saved back when done.
pub struct Session<S: SnapshotStore> {
    pub library: InMemoryLibrary,
    store: S,
}

impl<S: SnapshotStore> Session<S> {
    pub fn open(store: S, clock: Arc<dyn Clock>, policy: FinePolicy) -> anyhow::Result<Self> {
        let snapshot = store.load().context("loading library")?;
        let library = InMemoryLibrary::from_snapshot(snapshot, clock, policy)
            .context("restoring library from saved data")?;
        Ok(Self { library, store })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let snapshot = self.library.snapshot()?;
        self.store.save(&snapshot).context("saving library")
    }
}
