//! TCP listener and service lifecycle.
//!
//! [`TrackerServer`] binds the configured address, runs an accept loop on
//! its own task, and keeps the set of live sessions. Stop is cooperative
//! with the same bounded wait-then-abort fallback the sessions use, so a
//! full shutdown is bounded even with stuck connections.

use crate::session::{SessionHandle, TrackerSession, join_bounded};
use geotrack_storage::Store;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Configuration for the tracker server
///
/// # Example
///
/// ```
/// use geotrack_server::ServerConfig;
///
/// let config = ServerConfig {
///     bind_addr: "0.0.0.0:9090".parse().unwrap(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listening socket to
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9090".parse().expect("default bind address"),
        }
    }
}

/// Errors that can occur during server lifecycle operations
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start()` called while the server is running
    #[error("server is already running")]
    AlreadyRunning,

    /// Failed to bind the listening socket
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// State that exists only while the server is started.
struct Running {
    /// Actual bound address (relevant with port 0)
    local_addr: SocketAddr,

    /// Stop signal observed by the accept loop
    stop_tx: watch::Sender<bool>,

    /// The accept loop task; owns the listening socket
    accept_task: JoinHandle<()>,

    /// Live sessions; guarded for structural mutation only
    sessions: Arc<Mutex<Vec<SessionHandle>>>,
}

/// The tracker TCP service.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use geotrack_server::{ServerConfig, TrackerServer};
/// use geotrack_storage::{Database, DatabaseConfig, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::new(DatabaseConfig::new("geotrack.db")).await?;
/// let store = Arc::new(Store::new(&db));
///
/// let mut server = TrackerServer::new(ServerConfig::default(), store);
/// server.start().await?;
/// // ... serve until shutdown is requested ...
/// server.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct TrackerServer {
    config: ServerConfig,
    store: Arc<Store>,
    running: Option<Running>,
}

impl TrackerServer {
    /// Create a server; nothing is bound until `start()`.
    pub fn new(config: ServerConfig, store: Arc<Store>) -> Self {
        Self {
            config,
            store,
            running: None,
        }
    }

    /// Bind the listening socket and start the accept loop.
    ///
    /// On a bind failure the server stays in the not-started state — there
    /// is no partial start.
    ///
    /// # Errors
    /// - `ServerError::AlreadyRunning` — started twice without a stop
    /// - `ServerError::Bind` — the address could not be bound
    pub async fn start(&mut self) -> Result<(), ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        info!("server starting");
        let listener =
            TcpListener::bind(self.config.bind_addr)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: self.config.bind_addr,
                    source,
                })?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "listening for tracker connections");

        let (stop_tx, stop_rx) = watch::channel(false);
        let sessions = Arc::new(Mutex::new(Vec::new()));

        let accept_task = tokio::spawn(accept_loop(
            listener,
            stop_rx,
            Arc::clone(&self.store),
            Arc::clone(&sessions),
        ));

        self.running = Some(Running {
            local_addr,
            stop_tx,
            accept_task,
            sessions,
        });

        Ok(())
    }

    /// Stop the accept loop, free the port, and stop every live session.
    ///
    /// Safe to call when the server is not running.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            debug!("stop requested but the server is not running");
            return;
        };

        info!("server stopping");
        running.stop_tx.send_replace(true);

        // The accept task owns the listener; once it ends the port is free
        join_bounded(running.accept_task, "accept loop", running.local_addr).await;

        let handles: Vec<SessionHandle> = {
            let mut sessions = running.sessions.lock().expect("session set poisoned");
            sessions.drain(..).collect()
        };
        for handle in handles {
            handle.stop().await;
        }

        info!("server stopped");
    }

    /// Whether `start()` has succeeded without a matching `stop()`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Actual bound address while running. Useful for tests binding port 0.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    /// Number of sessions accepted and not yet reaped.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.running
            .as_ref()
            .map(|running| {
                running
                    .sessions
                    .lock()
                    .expect("session set poisoned")
                    .len()
            })
            .unwrap_or(0)
    }
}

/// Accept connections until the stop signal; each one becomes a session.
async fn accept_loop(
    listener: TcpListener,
    mut stop_rx: watch::Receiver<bool>,
    store: Arc<Store>,
    sessions: Arc<Mutex<Vec<SessionHandle>>>,
) {
    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                // Stop requested, or the server handle dropped
                let _ = changed;
                debug!("accept loop stopping");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(peer = %addr, "new tracker connection");
                    match TrackerSession::spawn(stream, Arc::clone(&store)) {
                        Ok(handle) => {
                            sessions
                                .lock()
                                .expect("session set poisoned")
                                .push(handle);
                        }
                        Err(e) => {
                            // Connection dropped; the server keeps accepting
                            error!(peer = %addr, error = %e, "could not create session");
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geotrack_storage::Database;

    async fn server() -> TrackerServer {
        let db = Database::in_memory().await.unwrap();
        let store = Arc::new(Store::new(&db));
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
        };
        TrackerServer::new(config, store)
    }

    #[test]
    fn test_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
    }

    #[tokio::test]
    async fn test_start_binds_ephemeral_port() {
        let mut server = server().await;
        assert!(!server.is_running());
        assert_eq!(server.local_addr(), None);

        server.start().await.unwrap();
        assert!(server.is_running());
        assert_ne!(server.local_addr().unwrap().port(), 0);

        server.stop().await;
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let mut server = server().await;
        server.start().await.unwrap();

        assert!(matches!(
            server.start().await,
            Err(ServerError::AlreadyRunning)
        ));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_start_is_safe() {
        let mut server = server().await;
        server.stop().await;
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_stop_frees_the_port() {
        let mut server = server().await;
        server.start().await.unwrap();
        let addr = server.local_addr().unwrap();
        server.stop().await;

        // The port must be rebindable once stop returns
        let rebound = TcpListener::bind(addr).await;
        assert!(rebound.is_ok());
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let mut server = server().await;
        server.start().await.unwrap();
        server.stop().await;

        server.start().await.unwrap();
        assert!(server.is_running());
        server.stop().await;
    }

    #[tokio::test]
    async fn test_session_count_empty() {
        let mut server = server().await;
        assert_eq!(server.session_count(), 0);
        server.start().await.unwrap();
        assert_eq!(server.session_count(), 0);
        server.stop().await;
    }
}
