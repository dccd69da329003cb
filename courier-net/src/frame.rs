//! Async frame I/O
//!
//! Reads and writes length-prefixed frames over any `AsyncRead`/`AsyncWrite`
//! pair. All waiting is readiness-driven; timeouts are applied by callers so
//! these functions stay usable with in-memory streams in tests.

use courier_protocol::{encode_frame, FrameError, FrameHeader};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Write one frame (header + payload) and flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_len: usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(payload, max_len)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame, returning its payload.
///
/// Returns `Ok(None)` if the peer closed the stream cleanly before the frame
/// started. EOF after the first header byte means the peer died mid-frame
/// and is surfaced as an error.
pub async fn read_frame<R>(reader: &mut R, max_len: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; FrameHeader::SIZE];
    let mut filled = 0;
    while filled < FrameHeader::SIZE {
        let n = reader.read(&mut header_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream closed mid-frame",
            )
            .into());
        }
        filled += n;
    }

    let header = FrameHeader::decode(&header_buf)?;
    let len = header.len as usize;
    if len > max_len {
        return Err(FrameError::FrameTooLarge { len, max: max_len }.into());
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}
