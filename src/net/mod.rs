//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (id + lifecycle tracking)
//!     → server.rs (length-delimited frames → FrameHandler → reply frame)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for graceful shutdown
//! - One reply per request frame, so a single connection can carry many requests

pub mod connection;
pub mod listener;
pub mod server;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Accepted, ConnectionSlot, Listener, ListenerError};
pub use server::{FrameHandler, FrameServer};
