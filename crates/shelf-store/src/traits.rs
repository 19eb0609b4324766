//! The [`SnapshotStore`] trait: the load/save boundary of a library.

use shelf_types::Snapshot;

use crate::error::StoreResult;

/// Storage backend for a whole library.
///
/// A library is loaded once at startup and written back in full at
/// shutdown; there are no incremental writes.
pub trait SnapshotStore: Send + Sync {
    /// Read the complete persisted state. A store with nothing in it yields
    /// an empty [`Snapshot`].
    fn load(&self) -> StoreResult<Snapshot>;

    /// Replace the persisted state with `snapshot`.
    fn save(&self, snapshot: &Snapshot) -> StoreResult<()>;
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<T> {
    fn load(&self) -> StoreResult<Snapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        (**self).save(snapshot)
    }
}
