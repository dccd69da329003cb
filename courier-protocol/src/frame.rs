//! Frame header and serialization
//!
//! Wire format:
//! - FrameHeader: 4 bytes (payload length, big-endian u32)
//! - Payload: variable length
//!
//! Message boundaries are a hard protocol contract: a frame is exactly
//! `len` payload bytes after the header, never more and never less.

use bytes::BufMut;
use thiserror::Error;

/// Framing errors
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame too large: {len} bytes, limit {max}")]
    FrameTooLarge { len: usize, max: usize },
    #[error("buffer too small: need {needed}, have {have}")]
    BufferTooSmall { needed: usize, have: usize },
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Frame header (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub len: u32,
}

impl FrameHeader {
    pub const SIZE: usize = 4;

    /// Serialize header to bytes
    pub fn encode(&self) -> [u8; 4] {
        self.len.to_be_bytes()
    }

    /// Deserialize header from bytes
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < Self::SIZE {
            return Err(FrameError::BufferTooSmall {
                needed: Self::SIZE,
                have: data.len(),
            });
        }

        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        Ok(Self { len })
    }
}

/// Serialize a complete frame (header + payload) for transmission.
///
/// Rejects payloads longer than `max_len` so oversized messages fail on the
/// sending side instead of being dropped by the peer.
pub fn encode_frame(payload: &[u8], max_len: usize) -> Result<Vec<u8>, FrameError> {
    if payload.len() > max_len {
        return Err(FrameError::FrameTooLarge {
            len: payload.len(),
            max: max_len,
        });
    }

    let mut buf = Vec::with_capacity(FrameHeader::SIZE + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(payload);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== FrameHeader Tests ====================

    #[test]
    fn test_frame_header_encode() {
        let header = FrameHeader { len: 1024 };

        let bytes = header.encode();

        assert_eq!(u32::from_be_bytes(bytes), 1024);
    }

    #[test]
    fn test_frame_header_roundtrip() {
        let original = FrameHeader { len: 0x12345678 };

        let bytes = original.encode();
        let decoded = FrameHeader::decode(&bytes).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn test_frame_header_decode_too_small() {
        let bytes = [0x01, 0x00, 0x00]; // Only 3 bytes

        let result = FrameHeader::decode(&bytes);

        assert!(matches!(result, Err(FrameError::BufferTooSmall { .. })));
    }

    #[test]
    fn test_frame_header_zero_length() {
        let header = FrameHeader { len: 0 };

        let decoded = FrameHeader::decode(&header.encode()).unwrap();

        assert_eq!(decoded.len, 0);
    }

    // ==================== encode_frame Tests ====================

    #[test]
    fn test_encode_frame_layout() {
        let frame = encode_frame(b"abc", 64).unwrap();

        assert_eq!(frame.len(), FrameHeader::SIZE + 3);
        assert_eq!(&frame[..4], &3u32.to_be_bytes());
        assert_eq!(&frame[4..], b"abc");
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let frame = encode_frame(b"", 64).unwrap();

        assert_eq!(frame, 0u32.to_be_bytes().to_vec());
    }

    #[test]
    fn test_encode_frame_too_large() {
        let payload = vec![0u8; 65];

        let result = encode_frame(&payload, 64);

        assert!(matches!(
            result,
            Err(FrameError::FrameTooLarge { len: 65, max: 64 })
        ));
    }

    #[test]
    fn test_encode_frame_at_limit() {
        let payload = vec![0u8; 64];

        assert!(encode_frame(&payload, 64).is_ok());
    }
}
