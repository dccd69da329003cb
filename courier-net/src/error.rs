//! Error types for connection and server operations.

use courier_protocol::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),
    #[error("{op} timed out")]
    Timeout { op: &'static str },
    #[error("connection closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;
