//! Protocol types for courier
//!
//! Implements the length-prefixed wire framing shared by client and server.

pub mod frame;
pub mod message;

pub use frame::*;
pub use message::*;

/// Default maximum payload length accepted from a peer (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;
