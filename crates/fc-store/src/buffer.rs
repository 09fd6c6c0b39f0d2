use chrono::{DateTime, Utc};
use fc_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A writable, not yet sealed object.
///
/// Returned by [`ObjectStore::create`](crate::ObjectStore::create) with a
/// zero-filled payload of the requested size. Hand it back to `seal` to
/// publish it, or to `abort` to release the reservation.
#[derive(Debug)]
pub struct ObjectBuffer {
    id: ObjectId,
    data: Vec<u8>,
}

impl ObjectBuffer {
    pub(crate) fn new(id: ObjectId, size: u64) -> Self {
        Self {
            id,
            data: vec![0u8; size as usize],
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy `src` into the start of the buffer.
    pub fn copy_from(&mut self, src: &[u8]) -> StoreResult<()> {
        if src.len() > self.data.len() {
            return Err(StoreError::Overflow {
                id: self.id,
                declared: self.size(),
                written: src.len() as u64,
            });
        }
        self.data[..src.len()].copy_from_slice(src);
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (ObjectId, Vec<u8>) {
        (self.id, self.data)
    }
}

/// Metadata reported for a sealed object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Payload size in bytes.
    pub data_size: u64,
    /// Size of the metadata attached at create time (always 0 for raw puts).
    pub metadata_size: u64,
    /// When the object was sealed.
    pub create_time: DateTime<Utc>,
}
