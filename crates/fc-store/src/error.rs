use fc_types::ObjectId;

/// Errors from local store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object is not sealed in the store.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The id is already pending or sealed; objects are write-once.
    #[error("object already exists: {0}")]
    AlreadyExists(ObjectId),

    /// The reservation does not fit in the remaining capacity.
    #[error("store capacity exceeded: requested {requested} bytes, {available} available")]
    CapacityExceeded { requested: u64, available: u64 },

    /// `seal` or `abort` was called for an id that has no pending buffer.
    #[error("object {0} has no pending buffer")]
    NotPending(ObjectId),

    /// More bytes were written than the buffer was created with.
    #[error("buffer overflow for {id}: declared {declared} bytes, got {written}")]
    Overflow { id: ObjectId, declared: u64, written: u64 },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
