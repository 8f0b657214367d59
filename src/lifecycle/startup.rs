//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared token store
//! - Bind backend services, then the relay worker, then the front door
//! - Report bound addresses so callers can use port 0
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Components initialize in order, not concurrently
//! - The front door binds last (traffic only when the chain is ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::RelayChainConfig;
use crate::http::FrontDoor;
use crate::lifecycle::Shutdown;
use crate::net::{FrameServer, Listener, ListenerError};
use crate::protocol::Credential;
use crate::relay::{self, Relay, RelayTargets, RelayWorker};
use crate::resilience::HopTimeouts;
use crate::services::{AuthService, TransformService};
use crate::store::{MemoryTokenStore, SharedTokenStore};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Failed to bind front door on {address}: {source}")]
    FrontDoorBind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{field}: invalid address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: no target configured and in-process service disabled")]
    MissingTarget { field: &'static str },

    #[error("{field}: credential must be exactly 4 bytes")]
    Credential { field: &'static str },
}

/// A running relay chain.
pub struct RunningApp {
    pub front_door_addr: SocketAddr,
    pub auth_addr: Option<SocketAddr>,
    pub transform_addr: Option<SocketAddr>,
    pub relay_targets: RelayTargets,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningApp {
    /// Wait for every component to stop.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Component task failed");
            }
        }
    }
}

/// Start every component with a fresh in-memory token store.
pub async fn start(config: &RelayChainConfig, shutdown: &Shutdown) -> Result<RunningApp, StartupError> {
    start_with_store(config, Arc::new(MemoryTokenStore::new()), shutdown).await
}

/// Start every component around the given token store.
pub async fn start_with_store(
    config: &RelayChainConfig,
    store: SharedTokenStore,
    shutdown: &Shutdown,
) -> Result<RunningApp, StartupError> {
    let mut tasks = Vec::new();
    let max_frame_length = config.protocol.max_frame_length;

    // 1. Backend services
    let auth_addr = if config.auth_service.enabled {
        let secret = credential("auth_service.secret", &config.auth_service.secret)?;
        let listener = Listener::bind(
            "auth",
            &config.auth_service.bind_address,
            config.auth_service.max_connections,
        )
        .await?;
        let server = FrameServer::new(
            listener,
            AuthService::new(secret, Arc::clone(&store)),
            max_frame_length,
        );
        let addr = server.local_addr().map_err(|source| ListenerError::Bind {
            service: "auth",
            address: config.auth_service.bind_address.clone(),
            source,
        })?;
        tasks.push(tokio::spawn(server.run(shutdown.subscribe())));
        Some(addr)
    } else {
        None
    };

    let transform_addr = if config.transform_service.enabled {
        let listener = Listener::bind(
            "transform",
            &config.transform_service.bind_address,
            config.transform_service.max_connections,
        )
        .await?;
        let server = FrameServer::new(
            listener,
            TransformService::new(Arc::clone(&store), config.protocol.extended_status),
            max_frame_length,
        );
        let addr = server.local_addr().map_err(|source| ListenerError::Bind {
            service: "transform",
            address: config.transform_service.bind_address.clone(),
            source,
        })?;
        tasks.push(tokio::spawn(server.run(shutdown.subscribe())));
        Some(addr)
    } else {
        None
    };

    // 2. Relay worker
    let relay_targets = RelayTargets {
        auth: target("relay.auth_address", config.relay.auth_address.as_deref(), auth_addr)?,
        transform: target(
            "relay.transform_address",
            config.relay.transform_address.as_deref(),
            transform_addr,
        )?,
    };
    let relay = Relay::new(
        relay_targets,
        credential("relay.credential", &config.relay.credential)?,
        HopTimeouts::from(&config.timeouts),
    )
    .with_max_frame_length(max_frame_length)
    .with_extended_status(config.protocol.extended_status);

    let (handle, requests) = relay::channel(config.relay.channel_capacity);
    tasks.push(tokio::spawn(
        RelayWorker::new(relay, requests).run(shutdown.subscribe()),
    ));

    // 3. Front door
    let address = &config.front_door.bind_address;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::FrontDoorBind {
            address: address.clone(),
            source,
        })?;
    let front_door_addr = listener
        .local_addr()
        .map_err(|source| StartupError::FrontDoorBind {
            address: address.clone(),
            source,
        })?;
    let front_door = FrontDoor::new(&config.front_door, handle);
    let front_door_shutdown = shutdown.subscribe();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = front_door.run(listener, front_door_shutdown).await {
            tracing::error!(error = %e, "Front door failed");
        }
    }));

    tracing::info!(
        front_door = %front_door_addr,
        auth = %relay_targets.auth,
        transform = %relay_targets.transform,
        "Relay chain started"
    );

    Ok(RunningApp {
        front_door_addr,
        auth_addr,
        transform_addr,
        relay_targets,
        tasks,
    })
}

fn credential(field: &'static str, bytes: &[u8]) -> Result<Credential, StartupError> {
    Credential::from_slice(bytes).ok_or(StartupError::Credential { field })
}

fn target(
    field: &'static str,
    configured: Option<&str>,
    local: Option<SocketAddr>,
) -> Result<SocketAddr, StartupError> {
    match (configured, local) {
        (Some(value), _) => value.parse().map_err(|_| StartupError::InvalidAddress {
            field,
            value: value.to_string(),
        }),
        (None, Some(addr)) => Ok(addr),
        (None, None) => Err(StartupError::MissingTarget { field }),
    }
}
