//! Transform ("screaming echo") service.
//!
//! Redeems a session token and echoes the payload upper-cased.

use bytes::Bytes;

use crate::net::FrameHandler;
use crate::observability::metrics;
use crate::protocol::{Reply, Status, TOKEN_LEN};
use crate::store::SharedTokenStore;

pub struct TransformService {
    store: SharedTokenStore,
    extended_status: bool,
}

impl TransformService {
    /// `extended_status` reports store lookup failures as `INTERNAL_FAILURE`;
    /// otherwise they are indistinguishable from an unknown token.
    pub fn new(store: SharedTokenStore, extended_status: bool) -> Self {
        Self {
            store,
            extended_status,
        }
    }

    /// Evaluate one transform request: `token (36 bytes) ++ payload`.
    pub fn transform(&self, request: &[u8]) -> Reply {
        if request.len() < TOKEN_LEN {
            tracing::debug!(request_len = request.len(), "Request shorter than a token");
            return Reply::status(Status::Unauthorized);
        }
        let (token, payload) = request.split_at(TOKEN_LEN);

        let Ok(token) = std::str::from_utf8(token) else {
            tracing::debug!("Token is not valid UTF-8");
            return Reply::status(Status::Unauthorized);
        };

        match self.store.get(token) {
            Ok(Some(true)) => {
                let output = String::from_utf8_lossy(payload).to_uppercase();
                Reply::ok(output.into_bytes())
            }
            Ok(_) => {
                tracing::debug!(token, "Token not authorized");
                Reply::status(Status::Unauthorized)
            }
            Err(e) => {
                tracing::error!(token, error = %e, "Token lookup failed");
                if self.extended_status {
                    Reply::status(Status::InternalFailure)
                } else {
                    Reply::status(Status::Unauthorized)
                }
            }
        }
    }
}

impl FrameHandler for TransformService {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn handle(&self, request: Bytes) -> Bytes {
        let reply = self.transform(&request);
        metrics::record_backend_reply(self.name(), reply.status);
        reply.encode()
    }
}
