//! HTTP front door.
//!
//! # Responsibilities
//! - Accept any method on any path
//! - Substitute the default payload for an empty body
//! - Hand the payload to the relay and wait for its answer
//! - Map the relay outcome to a status code and body
//! - Wire up middleware (tracing, timeout, body limit, request ID)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::FrontDoorConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::relay::{DispatchError, RelayHandle};

/// State injected into the handler.
#[derive(Clone)]
pub struct FrontDoorState {
    pub relay: RelayHandle,
    pub default_payload: Arc<str>,
}

/// HTTP server bridging inbound requests to the relay.
pub struct FrontDoor {
    router: Router,
}

impl FrontDoor {
    pub fn new(config: &FrontDoorConfig, relay: RelayHandle) -> Self {
        Self {
            router: Self::build_router(config, relay),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// A request that outlives `request_timeout_secs` is answered like any
    /// unclassified relay failure: 500 with an empty body.
    pub fn build_router(config: &FrontDoorConfig, relay: RelayHandle) -> Router {
        let state = FrontDoorState {
            relay,
            default_payload: Arc::from(config.default_payload.as_str()),
        };

        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                Duration::from_secs(config.request_timeout_secs),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Front door listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Front door stopped");
        Ok(())
    }
}

/// Derive the relay payload from the inbound body.
pub fn request_payload(body: &[u8], default_payload: &str) -> String {
    if body.is_empty() {
        default_payload.to_string()
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Status returned for a failed relay call.
pub fn failure_status(error: &DispatchError) -> StatusCode {
    error
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn relay_handler(
    State(state): State<FrontDoorState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers);
    let payload = request_payload(&body, &state.default_payload);

    tracing::debug!(
        request_id = request_id.as_deref().unwrap_or("-"),
        payload_len = payload.len(),
        "Forwarding to relay"
    );

    match state.relay.request(payload, request_id.clone()).await {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            output,
        )
            .into_response(),
        Err(e) => {
            let status = failure_status(&e);
            tracing::warn!(
                request_id = request_id.as_deref().unwrap_or("-"),
                status = status.as_u16(),
                error = %e,
                "Relay call failed"
            );
            status.into_response()
        }
    }
}
