//! Command wire codec.
//!
//! Every bus message is a fixed 8-byte header followed by a UTF-8 JSON body:
//!
//! ```text
//! bytes[0..4]  u32 command id   (big-endian)
//! bytes[4..8]  u32 server mask  (big-endian)
//! bytes[8..]   JSON payload
//! ```
//!
//! Command ids are family-local and only need to be consistent across the
//! controllers of one deployment; they are not a public interface.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use warden_core::ServerMask;

/// Length of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 8;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Frame too short: {0} bytes, header needs {HEADER_LEN}")]
    TruncatedHeader(usize),

    #[error("Unknown command id: {0}")]
    UnknownCommand(u32),

    #[error("Malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// One decoded bus message: header fields plus the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command_id: u32,
    pub server_mask: ServerMask,
    pub body: Vec<u8>,
}

impl Frame {
    /// Create a frame with a raw body.
    #[must_use]
    pub fn new(command_id: u32, server_mask: ServerMask, body: Vec<u8>) -> Self {
        Self { command_id, server_mask, body }
    }

    /// Create a frame whose body is the JSON encoding of `payload`.
    pub fn with_json<T: Serialize>(
        command_id: u32,
        server_mask: ServerMask,
        payload: &T,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(command_id, server_mask, serde_json::to_vec(payload)?))
    }

    /// Create a frame with an empty body.
    #[must_use]
    pub fn empty(command_id: u32, server_mask: ServerMask) -> Self {
        Self::new(command_id, server_mask, Vec::new())
    }

    /// Parse the JSON body.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Whether the frame carries a body at all.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Encode to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.body.len());
        bytes.extend_from_slice(&self.command_id.to_be_bytes());
        bytes.extend_from_slice(&self.server_mask.bits().to_be_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Decode from the wire representation.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::TruncatedHeader(bytes.len()));
        }

        // Slices are length-checked above; the fallbacks are unreachable.
        let command_id = u32::from_be_bytes(bytes[0..4].try_into().unwrap_or([0; 4]));
        let mask_bits = u32::from_be_bytes(bytes[4..8].try_into().unwrap_or([0; 4]));

        Ok(Self {
            command_id,
            server_mask: ServerMask::from_bits(mask_bits),
            body: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// Whether a controller for the given server number must act on this
    /// frame.
    #[must_use]
    pub fn targets(&self, server: u8) -> bool {
        self.server_mask.contains(server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        player_id: String,
        record_id: i64,
    }

    #[test]
    fn test_frame_round_trip() {
        let payload = Payload { player_id: "p1".to_string(), record_id: 42 };
        let mask = ServerMask::from_servers([1, 3]);
        let frame = Frame::with_json(5, mask, &payload).unwrap();

        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.json_body::<Payload>().unwrap(), payload);
    }

    #[test]
    fn test_header_layout() {
        let frame = Frame::empty(0x0102_0304, ServerMask::from_bits(0x0506_0708));
        let bytes = frame.encode();
        assert_eq!(&bytes[0..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[4..8], &[0x05, 0x06, 0x07, 0x08]);
        assert_eq!(bytes.len(), HEADER_LEN);
    }

    #[test]
    fn test_empty_body_round_trip() {
        let frame = Frame::empty(2, ServerMask::ALL);
        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
        assert!(!decoded.has_body());
    }

    #[test]
    fn test_truncated_header() {
        let err = Frame::decode(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedHeader(3)));
    }

    #[test]
    fn test_targeting() {
        let frame = Frame::empty(0, ServerMask::from_servers([2]));
        assert!(frame.targets(2));
        assert!(!frame.targets(1));
        assert!(!frame.targets(3));
    }

    #[test]
    fn test_malformed_body_surfaces_on_typed_decode() {
        let frame = Frame::new(1, ServerMask::ALL, b"not json".to_vec());
        // Header decode succeeds; the body only fails when interpreted.
        let decoded = Frame::decode(&frame.encode()).unwrap();
        assert!(decoded.json_body::<Payload>().is_err());
    }
}
