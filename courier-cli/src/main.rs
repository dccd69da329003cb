//! courier command line
//!
//! `courier listen` runs a concurrent echo server; `courier send` delivers
//! one message and prints the reply.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use courier_net::{Connection, Error, Options, Server};
use courier_protocol::Mode;

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Framed message exchange over TCP", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an echo server
    Listen {
        /// Address to bind (e.g., "127.0.0.1:7400")
        addr: String,

        /// Maximum concurrent clients
        #[arg(long, default_value_t = 64)]
        max_clients: usize,

        /// Treat payloads as raw bytes instead of UTF-8 text
        #[arg(long)]
        binary: bool,

        /// Per-operation timeout in seconds
        #[arg(long, default_value_t = 20)]
        timeout: u64,
    },
    /// Send one message and print the reply
    Send {
        /// Address to connect to (e.g., "127.0.0.1:7400")
        addr: String,

        /// Message payload
        message: String,

        /// Per-operation timeout in seconds
        #[arg(long, default_value_t = 20)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Listen {
            addr,
            max_clients,
            binary,
            timeout,
        } => listen(&addr, max_clients, binary, timeout).await,
        Commands::Send {
            addr,
            message,
            timeout,
        } => send(&addr, &message, timeout).await,
    }
}

async fn listen(addr: &str, max_clients: usize, binary: bool, timeout: u64) -> Result<()> {
    let options = Options {
        timeout: Duration::from_secs(timeout),
        mode: if binary { Mode::Binary } else { Mode::Text },
        ..Default::default()
    };

    let server = Server::bind(addr, options)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("echo server on {}", server.local_addr()?);

    let echo = |mut conn: Connection| async move {
        let peer = conn.peer_addr();
        loop {
            let msg = match conn.recv().await {
                Ok(msg) => msg,
                Err(Error::Closed) => {
                    info!("{} disconnected", peer);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            info!("{} sent {} bytes", peer, msg.len());
            conn.send(msg).await?;
        }
    };

    tokio::select! {
        result = server.serve(max_clients, echo) => {
            result.context("server failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}

async fn send(addr: &str, message: &str, timeout: u64) -> Result<()> {
    let options = Options {
        timeout: Duration::from_secs(timeout),
        ..Default::default()
    };

    let mut conn = Connection::connect(addr, options)
        .await
        .with_context(|| format!("failed to connect to {}", addr))?;

    match conn.send_and_recv(message).await {
        Ok(reply) => println!("{}", reply),
        Err(e) => {
            error!("exchange failed: {}", e);
            conn.close().await;
            return Err(e.into());
        }
    }

    conn.close().await;
    Ok(())
}
