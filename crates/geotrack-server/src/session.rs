//! Per-connection tracker session.
//!
//! A session owns one device socket and runs its own read loop: decode
//! frames, bind the device identity against the tracker registry, dispatch
//! to the handler named by the command table, send response frames. One bad
//! frame never ends a session — only socket errors, a clean disconnect, or
//! an explicit stop do.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──spawn──> Active ──stop/EOF/io error──> Stopping ──> Stopped
//! ```
//!
//! Construction requires an already-connected socket. Stopping is
//! cooperative: the loop checks a stop signal at its blocking read; the
//! owner waits a bounded interval (10 s at 100 ms polling) and aborts the
//! task if it does not finish, so shutdown latency is always bounded. On the
//! way out the session marks its tracker offline and the socket closes with
//! the framed stream.

use futures::{SinkExt, StreamExt};
use geotrack_core::{
    ConnectionStatus, DeviceId, Error as ProtocolError,
    constants::{HANDSHAKE_ACK_BODY, SHUTDOWN_POLL_INTERVAL_MS, SHUTDOWN_WAIT_MS},
};
use geotrack_protocol::{CommandCode, Frame, HandlerKind, LocationReport, TrackerCodec};
use geotrack_storage::{Position, Store, StorageError, Tracker};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

/// Errors that can occur while setting up a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The socket handed in was not a connected TCP stream
    #[error("cannot create a session without a connected socket: {0}")]
    NotConnected(#[source] std::io::Error),
}

/// Errors a single frame's handling can produce. Caught at the dispatch
/// boundary and logged; never ends the session.
#[derive(Debug, Error)]
enum HandlerError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("feedback received before tracker identity was bound")]
    NotBound,
}

/// The read/dispatch loop state for one device connection.
pub struct TrackerSession {
    /// Frame-level view of the socket
    framed: Framed<TcpStream, TrackerCodec>,

    /// Remote device address, for logs
    peer_addr: SocketAddr,

    /// Lock-aware persistence facade
    store: Arc<Store>,

    /// Bound tracker record; `None` until the handshake check matches one
    tracker: Option<Tracker>,

    /// Stop signal observed at the blocking read
    stop_rx: watch::Receiver<bool>,

    /// Flipped once the device identity is bound
    ready_tx: watch::Sender<bool>,
}

impl TrackerSession {
    /// Validate the socket and start the session's read loop task.
    ///
    /// # Errors
    /// Returns `SessionError::NotConnected` when the stream has no peer
    /// address, i.e. it was never connected.
    pub fn spawn(stream: TcpStream, store: Arc<Store>) -> Result<SessionHandle, SessionError> {
        let peer_addr = stream.peer_addr().map_err(SessionError::NotConnected)?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = watch::channel(false);

        let session = TrackerSession {
            framed: Framed::new(stream, TrackerCodec::new()),
            peer_addr,
            store,
            tracker: None,
            stop_rx,
            ready_tx,
        };

        info!(peer = %peer_addr, "session starting");
        let task = tokio::spawn(session.run());

        Ok(SessionHandle {
            peer_addr,
            stop_tx,
            ready_rx,
            task,
        })
    }

    /// Read loop: frames are processed strictly in arrival order.
    async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.stop_rx.changed() => {
                    // Stop requested, or every handle dropped
                    let _ = changed;
                    debug!(peer = %self.peer_addr, "stop signal observed");
                    break;
                }
                item = self.framed.next() => match item {
                    Some(Ok(frame)) => self.on_frame(frame).await,
                    Some(Err(ProtocolError::Io(e))) => {
                        info!(peer = %self.peer_addr, error = %e, "socket error, session ending");
                        break;
                    }
                    Some(Err(e)) => {
                        // Malformed frame: log with context, keep reading
                        error!(peer = %self.peer_addr, error = %e, "dropping malformed frame");
                    }
                    None => {
                        info!(peer = %self.peer_addr, "device disconnected");
                        break;
                    }
                }
            }
        }

        self.finish().await;
    }

    /// Handle one validated frame: handshake-check, then dispatch.
    async fn on_frame(&mut self, frame: Frame) {
        debug!(
            peer = %self.peer_addr,
            frame = %frame,
            command = frame.command().descriptor().description,
            "frame received"
        );

        // Identity must be checked before any handler runs; a failure here
        // skips the handler but never the session
        if let Err(e) = self.check_handshake(&frame).await {
            error!(peer = %self.peer_addr, frame = %frame, error = %e, "handshake check failed");
            return;
        }

        let Some(handler) = frame.command().descriptor().handler else {
            // Pure response codes carry no handler
            return;
        };

        let result = match handler {
            HandlerKind::Handshake => self.on_handshake(&frame).await,
            HandlerKind::Login => self.on_login(&frame).await,
            HandlerKind::Feedback => self.on_feedback(&frame).await,
        };

        if let Err(e) = result {
            error!(peer = %self.peer_addr, frame = %frame, error = %e, "frame handler failed");
        }
    }

    /// Bind the session to a tracker record, creating one for devices the
    /// registry has never seen. Runs on every frame until an identity is
    /// bound, then becomes a no-op.
    async fn check_handshake(&mut self, frame: &Frame) -> Result<(), HandlerError> {
        if self.tracker.is_some() {
            return Ok(());
        }

        let device_id = frame.device_id();
        match self.store.find_tracker_by_device_id(device_id.as_str()).await? {
            None => {
                info!(
                    device_id = %device_id,
                    "connected tracker not found in the registry, creating a new record"
                );
                self.store
                    .register_tracker(&Tracker::auto_registered(device_id))
                    .await?;
                // Not bound yet: the next frame finds the fresh record
            }
            Some(mut tracker) => {
                tracker.set_connection_status(ConnectionStatus::Online);
                self.store.update_tracker(&tracker).await?;
                info!(
                    device_id = %device_id,
                    tracker_id = tracker.id,
                    "tracker bound to session"
                );
                self.tracker = Some(tracker);
                self.ready_tx.send_replace(true);
            }
        }

        Ok(())
    }

    /// `BP00`: acknowledge the handshake signal.
    async fn on_handshake(&mut self, frame: &Frame) -> Result<(), HandlerError> {
        self.send_frame(frame.device_id(), CommandCode::HandshakeAck, HANDSHAKE_ACK_BODY)
            .await
    }

    /// `BP05`: acknowledge the login message.
    async fn on_login(&mut self, frame: &Frame) -> Result<(), HandlerError> {
        self.send_frame(frame.device_id(), CommandCode::LoginAck, "").await
    }

    /// `BR00`: decode the location report and persist it.
    async fn on_feedback(&mut self, frame: &Frame) -> Result<(), HandlerError> {
        let report = LocationReport::parse(frame.body())?;
        info!(
            device_id = %frame.device_id(),
            location = %report,
            "position received"
        );

        let tracker = self.tracker.as_ref().ok_or(HandlerError::NotBound)?;
        self.store
            .record_position(&Position::from_report(tracker.id, &report))
            .await?;

        Ok(())
    }

    /// Build and send a response frame, echoing the device's own id.
    async fn send_frame(
        &mut self,
        device_id: &DeviceId,
        command: CommandCode,
        body: &str,
    ) -> Result<(), HandlerError> {
        let frame = Frame::build(device_id, command, body)?;
        info!(peer = %self.peer_addr, frame = %frame, "sending frame");
        self.framed.send(frame).await?;
        Ok(())
    }

    /// Mark the bound tracker offline and let the socket close with the
    /// framed stream. Runs on every loop exit path.
    async fn finish(mut self) {
        if let Some(mut tracker) = self.tracker.take() {
            tracker.set_connection_status(ConnectionStatus::Offline);
            if let Err(e) = self.store.update_tracker(&tracker).await {
                error!(
                    device_id = %tracker.device_id,
                    error = %e,
                    "could not mark tracker offline"
                );
            }
        }
        info!(peer = %self.peer_addr, "session stopped");
    }
}

/// Owner-side handle for a running session.
pub struct SessionHandle {
    peer_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Remote device address.
    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Whether the session's read loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Whether the session has bound a tracker identity.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready_rx.borrow()
    }

    /// Wait up to `timeout` for the session to bind its tracker identity.
    ///
    /// Returns `true` once bound, `false` on timeout or if the session ended
    /// without binding.
    pub async fn wait_ready(&mut self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.ready_rx.wait_for(|ready| *ready))
            .await
            .map(|result| result.is_ok())
            .unwrap_or(false)
    }

    /// Signal the read loop to exit at its next check, without waiting.
    pub fn request_stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Stop the session and wait for it to finish.
    ///
    /// Waits up to the bounded shutdown window, aborting the task as the
    /// last resort — the abort may leave in-flight handler work incomplete,
    /// which is logged and accepted.
    pub async fn stop(self) {
        self.request_stop();
        join_bounded(self.task, "session", self.peer_addr).await;
    }
}

/// Wait for an owned task to finish, polling up to the shutdown window, then
/// abort it. Keeps shutdown latency bounded no matter what the task is doing.
pub(crate) async fn join_bounded(task: JoinHandle<()>, what: &str, peer: SocketAddr) {
    let budget = SHUTDOWN_WAIT_MS / SHUTDOWN_POLL_INTERVAL_MS;
    let mut polls = 0;

    while !task.is_finished() {
        tokio::time::sleep(Duration::from_millis(SHUTDOWN_POLL_INTERVAL_MS)).await;
        polls += 1;
        if polls >= budget {
            warn!(peer = %peer, "{what} did not stop within the shutdown window, aborting");
            task.abort();
            break;
        }
    }

    // Collect the task result; a JoinError after abort is expected
    let _ = task.await;
}
