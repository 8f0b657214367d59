//! Framed request/reply server loop shared by the backend services.
//!
//! # Responsibilities
//! - Accept connections from a bounded [`Listener`]
//! - Decode request frames and hand each one to a [`FrameHandler`]
//! - Write exactly one reply frame per request frame, in order
//! - Stop accepting on shutdown and drain open connections

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::net::connection::{ConnectionGuard, ConnectionTracker};
use crate::net::listener::{Accepted, Listener, ListenerError};
use crate::observability::metrics;
use crate::protocol::framed;

/// How long shutdown waits for open connections to finish.
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// Pause after a failed accept, so a persistent error (EMFILE) cannot spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Turns one request frame into one reply frame.
///
/// Implementations must always produce a reply, whatever the input.
pub trait FrameHandler: Send + Sync + 'static {
    /// Service name for logs and metrics.
    fn name(&self) -> &'static str;

    fn handle(&self, request: Bytes) -> Bytes;
}

/// A TCP server answering framed requests with a [`FrameHandler`].
pub struct FrameServer<H> {
    listener: Listener,
    handler: Arc<H>,
    max_frame_length: usize,
    tracker: ConnectionTracker,
}

impl<H: FrameHandler> FrameServer<H> {
    pub fn new(listener: Listener, handler: H, max_frame_length: usize) -> Self {
        Self {
            listener,
            handler: Arc::new(handler),
            max_frame_length,
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let name = self.handler.name();
        tracing::info!(
            service = name,
            max_connections = self.listener.max_connections(),
            "Service accepting connections"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(service = name, "Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(Accepted { stream, peer, slot }) => {
                        let guard = self.tracker.open(peer, slot);
                        metrics::record_backend_connection(name);
                        tracing::debug!(
                            service = name,
                            connection_id = %guard.id(),
                            peer_addr = %guard.peer(),
                            "Connection opened"
                        );
                        tokio::spawn(serve_connection(
                            stream,
                            Arc::clone(&self.handler),
                            self.max_frame_length,
                            shutdown.resubscribe(),
                            guard,
                        ));
                    }
                    Err(ListenerError::Closed) => break,
                    Err(e) => {
                        tracing::warn!(service = name, error = %e, "Accept failed");
                        if !pause_after_accept_error(&mut shutdown).await {
                            break;
                        }
                    }
                },
            }
        }

        if !self.tracker.drain(DRAIN_DEADLINE).await {
            tracing::warn!(
                service = name,
                open_connections = self.tracker.open_count(),
                "Connections still open after drain deadline"
            );
        }
        tracing::info!(service = name, "Service stopped");
    }
}

/// Wait out [`ACCEPT_RETRY_DELAY`]. `false` when shutdown fired meanwhile.
async fn pause_after_accept_error(shutdown: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        _ = shutdown.recv() => false,
        _ = tokio::time::sleep(ACCEPT_RETRY_DELAY) => true,
    }
}

async fn serve_connection<H: FrameHandler>(
    stream: TcpStream,
    handler: Arc<H>,
    max_frame_length: usize,
    mut shutdown: broadcast::Receiver<()>,
    guard: ConnectionGuard,
) {
    let name = handler.name();
    let mut frames = framed(stream, max_frame_length);

    loop {
        let request = tokio::select! {
            _ = shutdown.recv() => break,
            next = frames.next() => match next {
                Some(Ok(frame)) => frame.freeze(),
                Some(Err(e)) => {
                    tracing::warn!(
                        service = name,
                        connection_id = %guard.id(),
                        peer_addr = %guard.peer(),
                        error = %e,
                        "Dropping connection on bad frame"
                    );
                    break;
                }
                None => break,
            },
        };

        let reply = handler.handle(request);
        if let Err(e) = frames.send(reply).await {
            tracing::warn!(service = name, connection_id = %guard.id(), error = %e, "Failed to write reply");
            break;
        }
    }
}
