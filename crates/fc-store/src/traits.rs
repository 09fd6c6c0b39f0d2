use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use fc_types::ObjectId;

use crate::buffer::{ObjectBuffer, ObjectMeta};
use crate::error::{StoreError, StoreResult};

/// Handle to a local store shared by a client and a server in one process.
pub type SharedStore = Arc<dyn ObjectStore>;

/// Fixed-capacity, write-once object store keyed by [`ObjectId`].
///
/// All implementations must satisfy these invariants:
/// - `create` on an id that is pending or sealed fails with `AlreadyExists`.
/// - An object is visible to `contains`, `get_buffers` and `list` only after
///   `seal`.
/// - Sealed objects are immutable.
/// - Concurrent `create`/`seal` calls on the same id are serialized: exactly
///   one caller wins.
pub trait ObjectStore: Send + Sync {
    /// Reserve `size` bytes under `id` and return a writable buffer.
    fn create(&self, id: ObjectId, size: u64) -> StoreResult<ObjectBuffer>;

    /// Publish a buffer obtained from `create`.
    fn seal(&self, buffer: ObjectBuffer) -> StoreResult<()>;

    /// Release a pending reservation without publishing it.
    fn abort(&self, buffer: ObjectBuffer) -> StoreResult<()>;

    /// Whether a sealed object exists under `id`.
    fn contains(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read sealed objects. Missing ids yield `None` at their position.
    fn get_buffers(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<Bytes>>>;

    /// Snapshot of every sealed object and its metadata.
    fn list(&self) -> StoreResult<BTreeMap<ObjectId, ObjectMeta>>;

    /// Read a single sealed object.
    fn get(&self, id: &ObjectId) -> StoreResult<Bytes> {
        self.get_buffers(std::slice::from_ref(id))?
            .pop()
            .flatten()
            .ok_or(StoreError::NotFound(*id))
    }

    /// Create a buffer sized to `data`, copy it in, and seal it.
    ///
    /// The reservation is released if the copy fails.
    fn put_raw(&self, id: ObjectId, data: &[u8]) -> StoreResult<()> {
        let mut buffer = self.create(id, data.len() as u64)?;
        if let Err(e) = buffer.copy_from(data) {
            self.abort(buffer)?;
            return Err(e);
        }
        self.seal(buffer)
    }
}
