//! Internal request/response channel between the front door and the relay.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::Instrument;

use crate::relay::client::Relay;
use crate::relay::error::{DispatchError, RelayFailure};

/// Reply sent back for one relay request.
pub type RelayResult = Result<Bytes, RelayFailure>;

/// One inbound call waiting for the relay.
#[derive(Debug)]
pub struct RelayRequest {
    pub payload: String,
    /// Correlation id from the front door, for logs.
    pub request_id: Option<String>,
    pub reply: oneshot::Sender<RelayResult>,
}

/// Caller side of the relay channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayRequest>,
}

/// Create a bounded relay channel.
pub fn channel(capacity: usize) -> (RelayHandle, mpsc::Receiver<RelayRequest>) {
    let (tx, rx) = mpsc::channel(capacity);
    (RelayHandle { tx }, rx)
}

impl RelayHandle {
    /// Submit `payload` and wait for the relay's answer.
    pub async fn request(
        &self,
        payload: String,
        request_id: Option<String>,
    ) -> Result<Bytes, DispatchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RelayRequest {
                payload,
                request_id,
                reply,
            })
            .await
            .map_err(|_| DispatchError::Unavailable)?;

        match rx.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(failure)) => Err(DispatchError::Failed(failure)),
            Err(_) => Err(DispatchError::Unavailable),
        }
    }
}

/// Consumes the relay channel, running each request on its own task.
pub struct RelayWorker {
    relay: Arc<Relay>,
    requests: mpsc::Receiver<RelayRequest>,
}

impl RelayWorker {
    pub fn new(relay: Relay, requests: mpsc::Receiver<RelayRequest>) -> Self {
        Self {
            relay: Arc::new(relay),
            requests,
        }
    }

    /// Serve requests until the channel closes or `shutdown` fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            auth = %self.relay.targets().auth,
            transform = %self.relay.targets().transform,
            "Relay worker started"
        );

        loop {
            let request = tokio::select! {
                _ = shutdown.recv() => break,
                next = self.requests.recv() => match next {
                    Some(request) => request,
                    None => break,
                },
            };

            let relay = Arc::clone(&self.relay);
            let span = tracing::info_span!(
                "relay",
                request_id = request.request_id.as_deref().unwrap_or("-")
            );
            tokio::spawn(
                async move {
                    let result = relay
                        .relay(&request.payload)
                        .await
                        .map_err(|e| e.into_failure());
                    if request.reply.send(result).is_err() {
                        tracing::debug!("Caller went away before relay finished");
                    }
                }
                .instrument(span),
            );
        }

        tracing::info!("Relay worker stopped");
    }
}
