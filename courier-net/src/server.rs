//! Listening side
//!
//! [`Server`] binds and listens at construction time. It offers two serving
//! modes: the sequential [`Server::get_next`], which accepts one connection
//! and reads one message to completion, and the concurrent [`Server::serve`],
//! which dispatches every accepted connection to its own task behind a
//! semaphore-bounded pool.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use courier_protocol::Message;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::options::Options;

/// One accepted message, with the connection it arrived on.
///
/// `connection` is `None` when the caller asked for the connection to be
/// closed immediately after the read.
#[derive(Debug)]
pub struct Inbound {
    pub message: Message,
    pub connection: Option<Connection>,
    pub peer: SocketAddr,
}

/// A listening TCP endpoint for framed messages.
pub struct Server {
    listener: Option<TcpListener>,
    options: Options,
}

impl Server {
    /// Bind and start listening on `addr` immediately.
    pub async fn bind<A: ToSocketAddrs>(addr: A, options: Options) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);

        Ok(Self {
            listener: Some(listener),
            options,
        })
    }

    /// The address actually bound (useful with ephemeral ports).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        let listener = self.listener.as_ref().ok_or(Error::Closed)?;
        Ok(listener.local_addr()?)
    }

    /// Accept one connection and read one message from it.
    ///
    /// Waits up to the configured timeout for a connection; expiry returns
    /// `Ok(None)` rather than an error. With `echo_back` the message is
    /// written back verbatim before returning. With `close_immediately` the
    /// new connection is shut down and [`Inbound::connection`] is `None`.
    pub async fn get_next(
        &mut self,
        echo_back: bool,
        close_immediately: bool,
    ) -> Result<Option<Inbound>> {
        let listener = self.listener.as_ref().ok_or(Error::Closed)?;

        let (stream, peer) = match timeout(self.options.timeout, listener.accept()).await {
            Ok(accepted) => accepted?,
            Err(_) => {
                debug!("no connection within {:?}", self.options.timeout);
                return Ok(None);
            }
        };
        debug!("accepted connection from {}", peer);

        let mut conn = Connection::from_stream(stream, self.options.clone())?;
        let message = conn.recv().await?;

        if echo_back {
            conn.send(message.clone()).await?;
        }

        let connection = if close_immediately {
            conn.close().await;
            None
        } else {
            Some(conn)
        };

        Ok(Some(Inbound {
            message,
            connection,
            peer,
        }))
    }

    /// Accept connections forever, handling each in its own task.
    ///
    /// At most `max_clients` connections are in flight at once; further
    /// accepts wait until a permit frees up. Handler failures are logged and
    /// do not stop the loop. The future completes only on listener failure;
    /// drop it to stop serving.
    pub async fn serve<F, Fut>(&self, max_clients: usize, handler: F) -> Result<()>
    where
        F: Fn(Connection) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let listener = self.listener.as_ref().ok_or(Error::Closed)?;
        let permits = Arc::new(Semaphore::new(max_clients));

        loop {
            let permit = match permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Ok(()),
            };

            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };
            debug!("accepted connection from {}", peer);

            let conn = match Connection::from_stream(stream, self.options.clone()) {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("failed to set up connection from {}: {}", peer, e);
                    continue;
                }
            };

            let handler = handler.clone();
            tokio::spawn(async move {
                let _permit = permit;
                if let Err(e) = handler(conn).await {
                    error!("connection from {} failed: {}", peer, e);
                }
            });
        }
    }

    /// Stop listening. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            if let Ok(addr) = listener.local_addr() {
                info!("closed listener on {}", addr);
            }
        }
    }
}
