//! Relay failure taxonomy.

use thiserror::Error;

/// Status reported to the front door for every classified relay failure.
pub const RELAY_FAILURE_STATUS: u16 = 500;

/// The two services the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Auth,
    Transform,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Auth => "auth",
            Backend::Transform => "transform",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Auth => f.write_str("authentication service"),
            Backend::Transform => f.write_str("echo service"),
        }
    }
}

/// Why a relay call failed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The authentication service rejected the relay's own credential.
    #[error("Invalid credentials")]
    InvalidCredential,

    /// A backend reported its own internal fault.
    #[error("Unexpected error")]
    UpstreamInternalFailure { backend: Backend },

    /// Unknown status byte, malformed or missing reply, or a timeout.
    #[error("Unexpected response from {backend}")]
    ProtocolViolation { backend: Backend, detail: String },

    /// The transform service rejected the token just minted.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Connect, write or read failed at the network layer.
    #[error("Failed to reach {backend}: {source}")]
    Transport {
        backend: Backend,
        #[source]
        source: std::io::Error,
    },
}

impl RelayError {
    pub(crate) fn protocol(backend: Backend, detail: impl Into<String>) -> Self {
        RelayError::ProtocolViolation {
            backend,
            detail: detail.into(),
        }
    }

    /// Numeric status propagated to the front door.
    ///
    /// Every failure kind is reported as an internal error; callers do not
    /// see the distinction.
    pub fn status(&self) -> u16 {
        RELAY_FAILURE_STATUS
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidCredential => "invalid_credential",
            RelayError::UpstreamInternalFailure { .. } => "upstream_internal_failure",
            RelayError::ProtocolViolation { .. } => "protocol_violation",
            RelayError::Unauthenticated => "unauthenticated",
            RelayError::Transport { .. } => "transport_failure",
        }
    }

    pub fn into_failure(self) -> RelayFailure {
        RelayFailure {
            status: self.status(),
            message: self.to_string(),
        }
    }
}

/// A failure as carried back over the relay channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({status})")]
pub struct RelayFailure {
    pub status: u16,
    pub message: String,
}

/// Outcome of dispatching a request to the relay worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The relay ran and reported a classified failure.
    #[error(transparent)]
    Failed(#[from] RelayFailure),

    /// The relay worker is gone; no status is attached.
    #[error("relay unavailable")]
    Unavailable,
}

impl DispatchError {
    /// The carried status, if the failure was classified.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::Failed(failure) => Some(failure.status),
            DispatchError::Unavailable => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_wire_semantics() {
        assert_eq!(RelayError::InvalidCredential.to_string(), "Invalid credentials");
        assert_eq!(
            RelayError::UpstreamInternalFailure { backend: Backend::Auth }.to_string(),
            "Unexpected error"
        );
        assert_eq!(
            RelayError::protocol(Backend::Auth, "status 9").to_string(),
            "Unexpected response from authentication service"
        );
        assert_eq!(
            RelayError::protocol(Backend::Transform, "empty").to_string(),
            "Unexpected response from echo service"
        );
        assert_eq!(RelayError::Unauthenticated.to_string(), "Unauthenticated");
    }

    #[test]
    fn every_kind_maps_to_internal_error() {
        let errors = vec![
            RelayError::InvalidCredential,
            RelayError::UpstreamInternalFailure { backend: Backend::Transform },
            RelayError::protocol(Backend::Auth, "x"),
            RelayError::Unauthenticated,
            RelayError::Transport {
                backend: Backend::Auth,
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            },
        ];
        for err in errors {
            assert_eq!(err.status(), 500, "{}", err.kind());
        }
    }

    #[test]
    fn failure_carries_status_and_message() {
        let failure = RelayError::Unauthenticated.into_failure();
        assert_eq!(failure.status, 500);
        assert_eq!(failure.message, "Unauthenticated");
        assert_eq!(DispatchError::from(failure).status(), Some(500));
        assert_eq!(DispatchError::Unavailable.status(), None);
    }
}
