//! Two-hop relay: authenticate, then transform.
//!
//! ```text
//! connect(auth) → send credential → read reply ──▶ token
//! connect(transform) → send token ++ payload → read reply ──▶ output
//! ```
//!
//! Every step is awaited in order and `?` short-circuits the rest of the
//! chain on the first failure. Each hop uses a fresh connection.

use std::net::SocketAddr;
use std::time::Instant;

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;

use crate::observability::metrics;
use crate::protocol::{framed, Credential, Reply, SessionToken, Status, DEFAULT_MAX_FRAME_LENGTH};
use crate::relay::error::{Backend, RelayError};
use crate::resilience::{HopTimeouts, Phase, TimedOut};

/// Where the relay sends each hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTargets {
    pub auth: SocketAddr,
    pub transform: SocketAddr,
}

/// Stateless orchestrator of the authenticate → transform exchange.
#[derive(Debug, Clone)]
pub struct Relay {
    targets: RelayTargets,
    credential: Credential,
    timeouts: HopTimeouts,
    max_frame_length: usize,
    extended_status: bool,
}

impl Relay {
    pub fn new(targets: RelayTargets, credential: Credential, timeouts: HopTimeouts) -> Self {
        Self {
            targets,
            credential,
            timeouts,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            extended_status: false,
        }
    }

    /// Largest reply frame accepted from either backend.
    pub fn with_max_frame_length(mut self, max_frame_length: usize) -> Self {
        self.max_frame_length = max_frame_length;
        self
    }

    /// Interpret a transform `INTERNAL_FAILURE` byte instead of treating it
    /// as an unexpected response.
    pub fn with_extended_status(mut self, extended_status: bool) -> Self {
        self.extended_status = extended_status;
        self
    }

    pub fn targets(&self) -> RelayTargets {
        self.targets
    }

    /// Run the full chain for one payload.
    pub async fn relay(&self, payload: &str) -> Result<Bytes, RelayError> {
        let start = Instant::now();
        let result = self.run_chain(payload).await;

        match &result {
            Ok(output) => {
                tracing::debug!(output_len = output.len(), "Relay succeeded");
                metrics::record_relay("ok", start);
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Relay failed");
                metrics::record_relay(e.kind(), start);
            }
        }
        result
    }

    async fn run_chain(&self, payload: &str) -> Result<Bytes, RelayError> {
        let token = self.authenticate().await?;
        self.transform(&token, payload).await
    }

    /// Hop 1: exchange the credential for a session token.
    pub async fn authenticate(&self) -> Result<SessionToken, RelayError> {
        let request = Bytes::copy_from_slice(self.credential.as_bytes());
        let reply = self.exchange(Backend::Auth, request).await?;

        match reply.status {
            Status::Ok => SessionToken::from_bytes(&reply.body).ok_or_else(|| {
                RelayError::protocol(
                    Backend::Auth,
                    format!("malformed token of {} bytes", reply.body.len()),
                )
            }),
            Status::Unauthorized => Err(RelayError::InvalidCredential),
            Status::InternalFailure => Err(RelayError::UpstreamInternalFailure {
                backend: Backend::Auth,
            }),
        }
    }

    /// Hop 2: redeem `token` and transform `payload`.
    pub async fn transform(&self, token: &SessionToken, payload: &str) -> Result<Bytes, RelayError> {
        let mut request = BytesMut::with_capacity(token.as_bytes().len() + payload.len());
        request.put_slice(token.as_bytes());
        request.put_slice(payload.as_bytes());

        let reply = self.exchange(Backend::Transform, request.freeze()).await?;

        match reply.status {
            Status::Ok => Ok(reply.body),
            Status::Unauthorized => Err(RelayError::Unauthenticated),
            Status::InternalFailure if self.extended_status => Err(RelayError::UpstreamInternalFailure {
                backend: Backend::Transform,
            }),
            Status::InternalFailure => Err(RelayError::protocol(
                Backend::Transform,
                "status 2 outside the extended profile",
            )),
        }
    }

    /// Open a connection, send one frame, read one frame.
    async fn exchange(&self, backend: Backend, request: Bytes) -> Result<Reply, RelayError> {
        let addr = match backend {
            Backend::Auth => self.targets.auth,
            Backend::Transform => self.targets.transform,
        };
        let timed_out = |e: TimedOut| RelayError::protocol(backend, e.to_string());
        let transport = |source: std::io::Error| RelayError::Transport { backend, source };

        let stream = self
            .timeouts
            .bound(Phase::Connect, TcpStream::connect(addr))
            .await
            .map_err(timed_out)?
            .map_err(transport)?;
        let mut frames = framed(stream, self.max_frame_length);

        tracing::trace!(backend = backend.as_str(), %addr, "Connected");

        self.timeouts
            .bound(Phase::Send, frames.send(request))
            .await
            .map_err(timed_out)?
            .map_err(transport)?;

        let frame = match self.timeouts.bound(Phase::Read, frames.next()).await.map_err(timed_out)? {
            Some(Ok(frame)) => frame.freeze(),
            Some(Err(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(RelayError::protocol(backend, e.to_string()));
            }
            Some(Err(e)) => return Err(transport(e)),
            None => return Err(RelayError::protocol(backend, "connection closed before reply")),
        };

        Reply::decode(frame).map_err(|e| RelayError::protocol(backend, e.to_string()))
    }
}
