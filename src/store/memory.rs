//! In-memory token store.

use std::sync::Arc;

use dashmap::DashMap;

use crate::protocol::SessionToken;
use crate::store::{StoreError, TokenStore};

/// A thread-safe token store backed by `DashMap`.
///
/// Cloning shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<DashMap<String, bool>>,
}

impl MemoryTokenStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every token currently held.
    pub fn tokens(&self) -> Vec<String> {
        self.inner.iter().map(|r| r.key().clone()).collect()
    }
}

impl TokenStore for MemoryTokenStore {
    fn insert(&self, token: &SessionToken, authenticated: bool) -> Result<(), StoreError> {
        self.inner.insert(token.as_str().to_string(), authenticated);
        Ok(())
    }

    fn get(&self, token: &str) -> Result<Option<bool>, StoreError> {
        Ok(self.inner.get(token).map(|r| *r.value()))
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
