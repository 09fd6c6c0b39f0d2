//! Local object storage for FlightCache.
//!
//! The local store is the single source of truth on a node. Clients and the
//! resolution server never keep their own copy of a payload: they create a
//! buffer here, copy bytes into it, and seal it.
//!
//! # Design Rules
//!
//! 1. Objects are write-once. Once sealed, an id maps to the same bytes for
//!    the lifetime of the store.
//! 2. A second `create` for an id that is pending or sealed fails with
//!    [`StoreError::AlreadyExists`]; nothing is ever overwritten.
//! 3. Only sealed objects are visible to `contains`, `get_buffers` and `list`.
//! 4. The store has a fixed capacity; reservations that do not fit fail.
//! 5. The store never interprets object contents.

pub mod buffer;
pub mod error;
pub mod memory;
pub mod traits;

pub use buffer::{ObjectBuffer, ObjectMeta};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryObjectStore, DEFAULT_CAPACITY};
pub use traits::{ObjectStore, SharedStore};
