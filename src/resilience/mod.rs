//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Relay hop to backend:
//!     → timeouts.rs (enforce connect / send / read deadline)
//!     → On timeout: hop fails, the relay call fails, no retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No automatic retries anywhere in the chain: a failed hop fails the request

pub mod timeouts;

pub use timeouts::{HopTimeouts, Phase, TimedOut};
