//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use relay_chain::config::RelayChainConfig;
use relay_chain::lifecycle::{self, RunningApp, Shutdown};
use relay_chain::protocol::framed;
use relay_chain::store::SharedTokenStore;

/// What a scripted backend does with one request frame.
pub enum Script {
    /// Reply with this frame body.
    Reply(Vec<u8>),
    /// Close the connection without replying.
    Close,
    /// Keep the connection open and never reply.
    Hang,
}

/// A mock backend speaking the frame protocol.
pub struct ScriptedBackend {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    /// Number of request frames received so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Start a framed mock backend answering each request with `f(request)`.
pub async fn start_scripted_backend<F>(f: F) -> ScriptedBackend
where
    F: Fn(Bytes) -> Script + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let f = Arc::new(f);

    let counter = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let f = Arc::clone(&f);
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut frames = framed(socket, 1024 * 1024);
                while let Some(Ok(frame)) = frames.next().await {
                    counter.fetch_add(1, Ordering::SeqCst);
                    match f(frame.freeze()) {
                        Script::Reply(body) => {
                            if frames.send(Bytes::from(body)).await.is_err() {
                                return;
                            }
                        }
                        Script::Close => return,
                        Script::Hang => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            return;
                        }
                    }
                }
            });
        }
    });

    ScriptedBackend { addr, requests }
}

/// Start a backend that writes `raw` bytes (no framing) and closes.
pub async fn start_raw_backend(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(raw).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config binding every component to an ephemeral local port.
pub fn local_config() -> RelayChainConfig {
    let mut config = RelayChainConfig::default();
    config.front_door.bind_address = "127.0.0.1:0".into();
    config.auth_service.bind_address = "127.0.0.1:0".into();
    config.transform_service.bind_address = "127.0.0.1:0".into();
    config.timeouts.connect_ms = 500;
    config.timeouts.read_ms = 1000;
    config
}

/// Start the whole chain.
pub async fn start_app(config: &RelayChainConfig) -> (RunningApp, Shutdown) {
    let shutdown = Shutdown::new();
    let app = lifecycle::start(config, &shutdown).await.unwrap();
    (app, shutdown)
}

/// Start the whole chain around a specific token store.
pub async fn start_app_with_store(
    config: &RelayChainConfig,
    store: SharedTokenStore,
) -> (RunningApp, Shutdown) {
    let shutdown = Shutdown::new();
    let app = lifecycle::start_with_store(config, store, &shutdown).await.unwrap();
    (app, shutdown)
}

/// HTTP client that never goes through a proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
