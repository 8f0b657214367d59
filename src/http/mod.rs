//! HTTP front door subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → request.rs (assign / propagate request ID)
//!     → server.rs (read body, default payload)
//!     → RelayHandle (internal channel to the relay)
//!     → server.rs (200 + body, or carried status + empty body)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{FrontDoor, FrontDoorState};
