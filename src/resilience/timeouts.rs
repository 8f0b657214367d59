//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap every relay suspension point (connect, send, read) with a deadline
//! - Report which phase ran out of time
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors; callers decide how to classify them

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::config::TimeoutConfig;

/// Step of a backend exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Send,
    Read,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Connect => f.write_str("connect"),
            Phase::Send => f.write_str("send"),
            Phase::Read => f.write_str("read"),
        }
    }
}

/// A phase did not finish within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{phase} timed out after {after:?}")]
pub struct TimedOut {
    pub phase: Phase,
    pub after: Duration,
}

/// Deadlines applied to each hop of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl HopTimeouts {
    pub fn limit(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Connect => self.connect,
            Phase::Send | Phase::Read => self.read,
        }
    }

    /// Run `fut` under the deadline for `phase`.
    pub async fn bound<F: Future>(&self, phase: Phase, fut: F) -> Result<F::Output, TimedOut> {
        let after = self.limit(phase);
        tokio::time::timeout(after, fut)
            .await
            .map_err(|_| TimedOut { phase, after })
    }
}

impl From<&TimeoutConfig> for HopTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_millis(config.connect_ms),
            read: Duration::from_millis(config.read_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeouts() -> HopTimeouts {
        HopTimeouts {
            connect: Duration::from_millis(10),
            read: Duration::from_millis(20),
        }
    }

    #[test]
    fn from_config() {
        let t = HopTimeouts::from(&TimeoutConfig::default());
        assert_eq!(t.connect, Duration::from_secs(2));
        assert_eq!(t.read, Duration::from_secs(5));
        assert_eq!(t.limit(Phase::Send), t.read);
    }

    #[tokio::test]
    async fn completes_within_deadline() {
        assert_eq!(timeouts().bound(Phase::Read, async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn reports_phase_on_timeout() {
        let err = timeouts()
            .bound(Phase::Connect, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert_eq!(err.phase, Phase::Connect);
        assert_eq!(err.after, Duration::from_millis(10));
        assert_eq!(err.to_string(), "connect timed out after 10ms");
    }
}
