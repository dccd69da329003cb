//! Message payloads
//!
//! A message is an opaque payload carried in one frame. There is no type tag
//! on the wire; the receiving side's configured [`Mode`] decides whether
//! payload bytes are decoded as UTF-8 text or kept raw.

use crate::frame::FrameError;
use bytes::Bytes;
use std::fmt;

/// How received payload bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Payloads are UTF-8 text; invalid UTF-8 is a framing error.
    #[default]
    Text,
    /// Payloads are raw bytes, passed through untouched.
    Binary,
}

/// One framed payload, text or binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Text(String),
    Binary(Bytes),
}

impl Message {
    /// Decode received payload bytes according to `mode`.
    pub fn decode(payload: Vec<u8>, mode: Mode) -> Result<Self, FrameError> {
        match mode {
            Mode::Text => Ok(Message::Text(String::from_utf8(payload)?)),
            Mode::Binary => Ok(Message::Binary(Bytes::from(payload))),
        }
    }

    /// Payload bytes as they go on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Message::Text(s) => s.as_bytes(),
            Message::Binary(b) => b,
        }
    }

    /// Consume the message, returning the text if it is one.
    pub fn into_text(self) -> Option<String> {
        match self {
            Message::Text(s) => Some(s),
            Message::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(s) => f.write_str(s),
            Message::Binary(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Text(s)
    }
}

impl From<Vec<u8>> for Message {
    fn from(b: Vec<u8>) -> Self {
        Message::Binary(Bytes::from(b))
    }
}

impl From<&[u8]> for Message {
    fn from(b: &[u8]) -> Self {
        Message::Binary(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for Message {
    fn from(b: Bytes) -> Self {
        Message::Binary(b)
    }
}
