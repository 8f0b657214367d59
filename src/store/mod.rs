//! Token store shared by the authentication and transform services.
//!
//! # Data Flow
//! ```text
//! AuthService ── insert(token, true) ──▶ TokenStore ◀── get(token) ── TransformService
//! ```
//!
//! # Design Decisions
//! - The store is an explicit handle (`Arc<dyn TokenStore>`) passed to both
//!   services at construction, never ambient global state
//! - Operations are fallible so services can report store faults on the wire
//! - No eviction or expiry: entries live for the lifetime of the process

pub mod memory;

pub use memory::MemoryTokenStore;

use std::sync::Arc;

use thiserror::Error;

use crate::protocol::SessionToken;

/// Errors a token store backend may report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// Concurrent mapping from session token to an "authenticated" flag.
///
/// A completed `insert` must be visible to every subsequent `get` of the
/// same token.
pub trait TokenStore: Send + Sync {
    /// Record the flag for `token`, replacing any previous value.
    fn insert(&self, token: &SessionToken, authenticated: bool) -> Result<(), StoreError>;

    /// Look up the flag for `token`. `Ok(None)` when the token is unknown.
    fn get(&self, token: &str) -> Result<Option<bool>, StoreError>;

    /// Number of tokens currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared handle to a token store.
pub type SharedTokenStore = Arc<dyn TokenStore>;
