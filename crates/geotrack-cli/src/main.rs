//! geotrack: TCP server for GPS tracker devices.
//!
//! Binds the tracker port, accepts device connections, and persists decoded
//! position reports until interrupted.

use anyhow::Context;
use clap::Parser;
use geotrack_server::{ServerConfig, TrackerServer};
use geotrack_storage::{Database, DatabaseConfig, Store};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geotrack", version, about = "GPS tracker server")]
struct Cli {
    /// Address to listen on for tracker connections
    #[arg(long, default_value = "0.0.0.0:9090")]
    bind: SocketAddr,

    /// SQLite database path
    #[arg(long, default_value = "geotrack.db")]
    database: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let db = Database::new(DatabaseConfig::new(&cli.database))
        .await
        .with_context(|| format!("opening database {}", cli.database))?;
    let store = Arc::new(Store::new(&db));

    let mut server = TrackerServer::new(ServerConfig { bind_addr: cli.bind }, store);
    server.start().await.context("starting tracker server")?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    server.stop().await;
    db.close().await;

    Ok(())
}
