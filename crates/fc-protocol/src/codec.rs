use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{FlightMessage, MAX_MESSAGE_SIZE};

/// Codec for encoding/decoding FlightCache protocol messages.
pub struct FlightCodec;

impl FlightCodec {
    /// Encode a message with framing: [4 bytes len][1 byte tag][payload]
    pub fn encode(msg: &FlightMessage) -> ProtocolResult<Vec<u8>> {
        let payload = bincode::serialize(msg)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(4 + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(msg.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode a framed message. Returns (message, bytes_consumed).
    pub fn decode(data: &[u8]) -> ProtocolResult<(FlightMessage, usize)> {
        if data.len() < 5 {
            return Err(ProtocolError::FramingError("too short".into()));
        }
        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if len < 1 {
            return Err(ProtocolError::FramingError("zero-length frame".into()));
        }
        if len - 1 > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge { size: len - 1, max: MAX_MESSAGE_SIZE });
        }
        let total = 4 + len;
        if data.len() < total {
            return Err(ProtocolError::FramingError(format!(
                "incomplete: have {}, need {}", data.len(), total
            )));
        }
        let tag = data[4];
        let payload = &data[5..total];
        let msg: FlightMessage = bincode::deserialize(payload)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        if msg.type_tag() != tag {
            return Err(ProtocolError::InvalidMessageType(tag));
        }
        Ok((msg, total))
    }

    /// Decode a body that must hold exactly one framed message.
    pub fn decode_exact(data: &[u8]) -> ProtocolResult<FlightMessage> {
        let (msg, consumed) = Self::decode(data)?;
        if consumed != data.len() {
            return Err(ProtocolError::FramingError(format!(
                "{} trailing bytes after {}", data.len() - consumed, msg.type_name()
            )));
        }
        Ok(msg)
    }
}
