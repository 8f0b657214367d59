//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! front door
//!     → channel.rs (RelayHandle::request → bounded mpsc → RelayWorker)
//!     → client.rs (Relay: auth hop, then transform hop)
//!     → error.rs (RelayError → RelayFailure { status, message })
//!     → oneshot reply back to the front door
//! ```
//!
//! # Design Decisions
//! - Stateless across requests; one task per request
//! - Hops are strictly sequential within a request, isolated across requests
//! - No pooling: every hop opens a fresh connection
//! - No retries: a failed hop fails the whole request

pub mod channel;
pub mod client;
pub mod error;

pub use channel::{channel, RelayHandle, RelayRequest, RelayResult, RelayWorker};
pub use client::{Relay, RelayTargets};
pub use error::{Backend, DispatchError, RelayError, RelayFailure, RELAY_FAILURE_STATUS};
