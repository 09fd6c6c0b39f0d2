//! Foundation types for FlightCache.
//!
//! This crate provides the identifiers and addressing types shared by the
//! local store, the resolution server, and the resolution client. Every
//! other FlightCache crate depends on `fc-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] — 20-byte identifier derived from a SHA-1 digest of a caller-chosen name
//! - [`FlightDescriptor`] — Network addressing of a flight, by path segments or by command
//! - [`FlightKey`] — Normalized, hashable lookup key built from a descriptor
//! - [`Ticket`] — Opaque token redeemed by a get call, encoding a [`FlightKey`]

pub mod error;
pub mod flight;
pub mod object;
pub mod ticket;

pub use error::TypeError;
pub use flight::{DescriptorKind, FlightDescriptor, FlightKey};
pub use object::{ObjectId, OBJECT_ID_LEN};
pub use ticket::{Ticket, TICKET_VERSION};
