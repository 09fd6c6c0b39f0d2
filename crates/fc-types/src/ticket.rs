//! Ticket encoding.
//!
//! A ticket is handed out by a flight-info lookup and redeemed by a later get
//! call. It carries a [`FlightKey`] in a fixed, versioned binary layout:
//!
//! ```text
//! "FCT" | version: u8 | kind: u8
//!   command: len: u32 be | utf-8 bytes
//!   path:    count: u32 be | (len: u32 be | bytes)*
//!   unknown: (nothing)
//! ```
//!
//! Decoding is a plain parser; ticket contents are never interpreted as
//! anything but data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::flight::{DescriptorKind, FlightKey};

const MAGIC: &[u8; 3] = b"FCT";

/// Current ticket layout version.
pub const TICKET_VERSION: u8 = 1;

/// Opaque token identifying a flight to stream back.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket(Vec<u8>);

impl Ticket {
    /// Wrap raw ticket bytes received from a peer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Serialize a key into a ticket.
    ///
    /// Only the field selected by `key.kind` is written. Decoding returns a
    /// key in the shape [`FlightKey::from_descriptor`] builds, so such keys
    /// round-trip exactly. A missing path encodes as an empty path and a
    /// missing command as an empty command. A field that does not match the
    /// kind is dropped.
    pub fn encode(key: &FlightKey) -> Self {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(MAGIC);
        buf.push(TICKET_VERSION);
        buf.push(key.kind.tag());
        match key.kind {
            DescriptorKind::Command => {
                let cmd = key.command.as_deref().unwrap_or_default();
                put_chunk(&mut buf, cmd.as_bytes());
            }
            DescriptorKind::Path => {
                let segments = key.path.as_deref().unwrap_or_default();
                buf.extend_from_slice(&(segments.len() as u32).to_be_bytes());
                for segment in segments {
                    put_chunk(&mut buf, segment);
                }
            }
            DescriptorKind::Unknown => {}
        }
        Self(buf)
    }

    /// Parse the key carried by this ticket.
    pub fn decode(&self) -> Result<FlightKey, TypeError> {
        let mut reader = Reader { data: &self.0, pos: 0 };
        if reader.take(MAGIC.len())? != MAGIC {
            return Err(TypeError::InvalidTicket("bad magic".into()));
        }
        let version = reader.byte()?;
        if version != TICKET_VERSION {
            return Err(TypeError::InvalidTicket(format!(
                "unsupported version {version}"
            )));
        }
        let tag = reader.byte()?;
        let kind = DescriptorKind::from_tag(tag)
            .ok_or_else(|| TypeError::InvalidTicket(format!("unknown descriptor kind {tag}")))?;
        let key = match kind {
            DescriptorKind::Command => {
                let raw = reader.chunk()?;
                let cmd = String::from_utf8(raw.to_vec())
                    .map_err(|e| TypeError::InvalidTicket(e.to_string()))?;
                FlightKey::new(kind, Some(cmd), None)
            }
            DescriptorKind::Path => {
                let count = reader.u32()? as usize;
                let mut segments = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    segments.push(reader.chunk()?.to_vec());
                }
                FlightKey::new(kind, None, Some(segments))
            }
            DescriptorKind::Unknown => FlightKey::new(kind, None, None),
        };
        if reader.pos != self.0.len() {
            return Err(TypeError::InvalidTicket(format!(
                "{} trailing bytes",
                self.0.len() - reader.pos
            )));
        }
        Ok(key)
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticket({})", hex::encode(&self.0))
    }
}

fn put_chunk(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
    buf.extend_from_slice(data);
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], TypeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                TypeError::InvalidTicket(format!(
                    "truncated: need {n} bytes at offset {}",
                    self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, TypeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, TypeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn chunk(&mut self) -> Result<&'a [u8], TypeError> {
        let len = self.u32()? as usize;
        self.take(len)
    }
}
