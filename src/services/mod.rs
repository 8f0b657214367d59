//! Backend TCP services.
//!
//! # Data Flow
//! ```text
//! relay ── credential ──▶ AuthService ── insert ──▶ TokenStore
//!       ◀── [1] + token ──
//!
//! relay ── token + payload ──▶ TransformService ── get ──▶ TokenStore
//!       ◀── [1] + PAYLOAD ──
//! ```
//!
//! Both services are stateless [`FrameHandler`](crate::net::FrameHandler)s
//! served by [`FrameServer`](crate::net::FrameServer); the only shared state
//! is the token store handle given to their constructors.

pub mod auth;
pub mod transform;

pub use auth::AuthService;
pub use transform::TransformService;

#[cfg(test)]
pub(crate) mod testing {
    use crate::protocol::SessionToken;
    use crate::store::{StoreError, TokenStore};

    /// A store whose every operation fails.
    pub struct FailingStore;

    impl TokenStore for FailingStore {
        fn insert(&self, _token: &SessionToken, _authenticated: bool) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("injected".into()))
        }

        fn get(&self, _token: &str) -> Result<Option<bool>, StoreError> {
            Err(StoreError::Unavailable("injected".into()))
        }

        fn len(&self) -> usize {
            0
        }
    }
}
