//! Bounded TCP listener for the backend services.
//!
//! # Responsibilities
//! - Bind a service address
//! - Hold back `accept` while `max_connections` sockets are open
//! - Hand each accepted socket out together with its slot

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to bind {service} service on {address}: {source}")]
    Bind {
        service: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Connection slots closed")]
    Closed,
}

/// A freshly accepted socket and the slot it occupies.
#[derive(Debug)]
pub struct Accepted {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    pub slot: ConnectionSlot,
}

/// One of the listener's `max_connections` slots. Released on drop.
#[derive(Debug)]
pub struct ConnectionSlot {
    _permit: OwnedSemaphorePermit,
}

/// A TCP listener that stops accepting once its slots are used up.
pub struct Listener {
    service: &'static str,
    inner: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    pub async fn bind(
        service: &'static str,
        address: &str,
        max_connections: usize,
    ) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            service,
            address: address.to_string(),
            source,
        };

        let addr: SocketAddr = address
            .parse()
            .map_err(|e| bind_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
        let inner = TcpListener::bind(addr).await.map_err(bind_error)?;
        let bound = inner.local_addr().map_err(bind_error)?;

        tracing::info!(service, address = %bound, max_connections, "Service listener bound");

        Ok(Self {
            service,
            inner,
            slots: Arc::new(Semaphore::new(max_connections)),
            max_connections,
        })
    }

    /// Wait for a free slot, then for the next inbound connection.
    pub async fn accept(&self) -> Result<Accepted, ListenerError> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;
        let (stream, peer) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::trace!(
            service = self.service,
            %peer,
            free_slots = self.slots.available_permits(),
            "Accepted"
        );

        Ok(Accepted {
            stream,
            peer,
            slot: ConnectionSlot { _permit: permit },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    pub fn free_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}
