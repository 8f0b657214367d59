//! Authentication service.
//!
//! Exchanges the shared secret for a freshly minted session token and
//! registers that token in the token store.

use bytes::Bytes;

use crate::net::FrameHandler;
use crate::observability::metrics;
use crate::protocol::{Credential, Reply, SessionToken, Status};
use crate::store::SharedTokenStore;

pub struct AuthService {
    secret: Credential,
    store: SharedTokenStore,
}

impl AuthService {
    pub fn new(secret: Credential, store: SharedTokenStore) -> Self {
        Self { secret, store }
    }

    /// Evaluate one authentication request.
    ///
    /// Only the first 4 bytes are compared; anything after them is ignored.
    pub fn authenticate(&self, request: &[u8]) -> Reply {
        if !self.secret.matches(request) {
            tracing::debug!(request_len = request.len(), "Credential rejected");
            return Reply::status(Status::Unauthorized);
        }

        let token = SessionToken::generate();
        match self.store.insert(&token, true) {
            Ok(()) => {
                tracing::debug!(token = %token, "Session token issued");
                Reply::ok(Bytes::copy_from_slice(token.as_bytes()))
            }
            Err(e) => {
                tracing::error!(token = %token, error = %e, "Failed to store session token");
                Reply::status(Status::InternalFailure)
            }
        }
    }
}

impl FrameHandler for AuthService {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn handle(&self, request: Bytes) -> Bytes {
        let reply = self.authenticate(&request);
        metrics::record_backend_reply(self.name(), reply.status);
        reply.encode()
    }
}
