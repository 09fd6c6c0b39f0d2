use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use bytes::Bytes;
use chrono::Utc;
use fc_types::ObjectId;

use crate::buffer::{ObjectBuffer, ObjectMeta};
use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// Default capacity: 100 MB.
pub const DEFAULT_CAPACITY: u64 = 100_000_000;

enum Entry {
    Pending { size: u64 },
    Sealed { data: Bytes, meta: ObjectMeta },
}

impl Entry {
    fn size(&self) -> u64 {
        match self {
            Self::Pending { size } => *size,
            Self::Sealed { meta, .. } => meta.data_size,
        }
    }
}

struct Inner {
    entries: HashMap<ObjectId, Entry>,
    used: u64,
}

/// In-memory, fixed-capacity object store.
///
/// Stands in for a shared-memory store: buffers are reserved with `create`,
/// filled by the caller and published with `seal`. Entries live behind a
/// single `RwLock`, which serializes competing `create`/`seal` calls. Reads
/// hand out cheap `Bytes` clones of the sealed payload.
pub struct InMemoryObjectStore {
    inner: RwLock<Inner>,
    capacity: u64,
}

impl InMemoryObjectStore {
    /// Create an empty store with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty store holding at most `capacity` bytes.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                used: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes reserved by pending and sealed objects.
    pub fn used_bytes(&self) -> u64 {
        self.inner.read().expect("lock poisoned").used
    }

    /// Number of sealed objects.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("lock poisoned")
            .entries
            .values()
            .filter(|e| matches!(e, Entry::Sealed { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn create(&self, id: ObjectId, size: u64) -> StoreResult<ObjectBuffer> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.entries.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let available = self.capacity - inner.used;
        if size > available {
            return Err(StoreError::CapacityExceeded {
                requested: size,
                available,
            });
        }
        inner.entries.insert(id, Entry::Pending { size });
        inner.used += size;
        Ok(ObjectBuffer::new(id, size))
    }

    fn seal(&self, buffer: ObjectBuffer) -> StoreResult<()> {
        let (id, data) = buffer.into_parts();
        let mut inner = self.inner.write().expect("lock poisoned");
        match inner.entries.get(&id) {
            Some(Entry::Pending { .. }) => {}
            _ => return Err(StoreError::NotPending(id)),
        }
        let meta = ObjectMeta {
            data_size: data.len() as u64,
            metadata_size: 0,
            create_time: Utc::now(),
        };
        inner.entries.insert(
            id,
            Entry::Sealed {
                data: Bytes::from(data),
                meta,
            },
        );
        tracing::debug!(object = %id.short_hex(), "sealed object");
        Ok(())
    }

    fn abort(&self, buffer: ObjectBuffer) -> StoreResult<()> {
        let id = buffer.id();
        let mut inner = self.inner.write().expect("lock poisoned");
        match inner.entries.get(&id) {
            Some(Entry::Pending { .. }) => {}
            _ => return Err(StoreError::NotPending(id)),
        }
        if let Some(entry) = inner.entries.remove(&id) {
            inner.used -= entry.size();
        }
        Ok(())
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(matches!(inner.entries.get(id), Some(Entry::Sealed { .. })))
    }

    fn get_buffers(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<Bytes>>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(ids
            .iter()
            .map(|id| match inner.entries.get(id) {
                Some(Entry::Sealed { data, .. }) => Some(data.clone()),
                _ => None,
            })
            .collect())
    }

    fn list(&self) -> StoreResult<BTreeMap<ObjectId, ObjectMeta>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .entries
            .iter()
            .filter_map(|(id, entry)| match entry {
                Entry::Sealed { meta, .. } => Some((*id, meta.clone())),
                Entry::Pending { .. } => None,
            })
            .collect())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .field("used_bytes", &self.used_bytes())
            .field("capacity", &self.capacity)
            .finish()
    }
}
