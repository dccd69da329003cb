//! Client-side TCP connection
//!
//! A [`Connection`] owns one connected socket and exchanges whole messages
//! with the peer. Every operation is bounded by the configured timeout.

use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::timeout;
use tracing::debug;

use courier_protocol::Message;

use crate::error::{Error, Result};
use crate::frame::{read_frame, write_frame};
use crate::options::Options;

/// One established connection exchanging framed messages.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    options: Options,
    open: bool,
}

impl Connection {
    /// Open a TCP connection to `addr`.
    ///
    /// Fails with [`Error::Io`] if the peer is unreachable and
    /// [`Error::Timeout`] if it does not answer within the configured
    /// timeout.
    pub async fn connect<A: ToSocketAddrs>(addr: A, options: Options) -> Result<Self> {
        let stream = timeout(options.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| Error::Timeout { op: "connect" })??;
        Self::from_stream(stream, options)
    }

    /// Wrap an already-connected stream (used by the server for accepted
    /// sockets).
    pub(crate) fn from_stream(stream: TcpStream, options: Options) -> Result<Self> {
        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        debug!("connection established with {}", peer);

        Ok(Self {
            stream,
            peer,
            options,
            open: true,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Send one message as a single frame.
    pub async fn send(&mut self, msg: impl Into<Message>) -> Result<()> {
        if !self.open {
            return Err(Error::Closed);
        }
        let msg = msg.into();
        timeout(
            self.options.timeout,
            write_frame(&mut self.stream, msg.as_bytes(), self.options.max_frame_len),
        )
        .await
        .map_err(|_| Error::Timeout { op: "send" })?
    }

    /// Receive one message.
    ///
    /// Returns [`Error::Timeout`] if no complete frame arrives in time and
    /// [`Error::Closed`] once the peer has shut the connection down.
    pub async fn recv(&mut self) -> Result<Message> {
        if !self.open {
            return Err(Error::Closed);
        }
        let payload = timeout(
            self.options.timeout,
            read_frame(&mut self.stream, self.options.max_frame_len),
        )
        .await
        .map_err(|_| Error::Timeout { op: "recv" })??;

        match payload {
            Some(bytes) => Ok(Message::decode(bytes, self.options.mode)?),
            None => {
                self.open = false;
                Err(Error::Closed)
            }
        }
    }

    /// Send a message and wait for the peer's reply.
    ///
    /// No atomicity guarantee: another writer interleaving messages on the
    /// same connection can claim the reply first.
    pub async fn send_and_recv(&mut self, msg: impl Into<Message>) -> Result<Message> {
        self.send(msg).await?;
        self.recv().await
    }

    /// Shut the connection down. Calling this more than once is a no-op.
    pub async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.stream.shutdown().await {
            debug!("shutdown of {} failed: {}", self.peer, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn test_options() -> Options {
        Options {
            timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_connect_unreachable() {
        // Nothing listens on the discard port of localhost.
        let result = Connection::connect("127.0.0.1:1", test_options()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recv_timeout_when_peer_silent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Accept but never send anything.
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let mut conn = Connection::connect(addr, test_options()).await.unwrap();
        let result = conn.recv().await;

        assert!(matches!(result, Err(Error::Timeout { op: "recv" })));
        server.abort();
    }

    #[tokio::test]
    async fn test_recv_timeout_when_peer_stalls_mid_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            // Promise 100 bytes, deliver 4, then stall past the timeout.
            stream.write_all(&100u32.to_be_bytes()).await.unwrap();
            stream.write_all(b"part").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let mut conn = Connection::connect(addr, test_options()).await.unwrap();
        let result = conn.recv().await;

        assert!(matches!(result, Err(Error::Timeout { op: "recv" })));
        server.abort();
    }

    #[tokio::test]
    async fn test_double_close_is_noop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut conn = Connection::connect(addr, test_options()).await.unwrap();
        assert!(conn.is_open());

        conn.close().await;
        assert!(!conn.is_open());

        // Second close must not fail or panic.
        conn.close().await;
        assert!(!conn.is_open());
    }

    #[tokio::test]
    async fn test_send_after_close_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut conn = Connection::connect(addr, test_options()).await.unwrap();
        conn.close().await;

        let result = conn.send("late").await;
        assert!(matches!(result, Err(Error::Closed)));
    }
}
