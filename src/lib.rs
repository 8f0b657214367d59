//! Multi-hop request relay.
//!
//! An HTTP front door hands each request to a relay, which authenticates
//! against one TCP service and redeems the resulting token at a second TCP
//! service that upper-cases the payload.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod relay;
pub mod resilience;
pub mod services;
pub mod store;

pub use config::RelayChainConfig;
pub use http::FrontDoor;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError, RelayHandle};
pub use store::{MemoryTokenStore, TokenStore};
