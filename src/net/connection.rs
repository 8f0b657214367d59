//! Open-connection bookkeeping for graceful shutdown.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::net::listener::ConnectionSlot;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique connection number, shown as `conn-N` in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Open {
    count: AtomicUsize,
    closed: Notify,
}

/// Counts the connections a service has open.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    open: Arc<Open>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accepted connection. The slot is held until the guard drops.
    pub fn open(&self, peer: SocketAddr, slot: ConnectionSlot) -> ConnectionGuard {
        self.open.count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            id: ConnectionId::next(),
            peer,
            open: Arc::clone(&self.open),
            _slot: slot,
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.count.load(Ordering::SeqCst)
    }

    /// Wait for every guard to drop. `false` if some were still alive at `deadline`.
    pub async fn drain(&self, deadline: Duration) -> bool {
        let all_closed = async {
            loop {
                let closed = self.open.closed.notified();
                if self.open_count() == 0 {
                    return;
                }
                closed.await;
            }
        };
        tokio::time::timeout(deadline, all_closed).await.is_ok()
    }
}

/// A live connection. Dropping it closes the books on that connection.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    peer: SocketAddr,
    open: Arc<Open>,
    _slot: ConnectionSlot,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.open.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.open.closed.notify_waiters();
        }
        tracing::trace!(connection_id = %self.id, peer = %self.peer, "Connection closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Listener;
    use tokio::net::TcpStream;

    async fn slot(listener: &Listener) -> (TcpStream, SocketAddr, ConnectionSlot) {
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let accepted = listener.accept().await.unwrap();
        (client, accepted.peer, accepted.slot)
    }

    #[tokio::test]
    async fn guards_are_counted_and_numbered() {
        let listener = Listener::bind("test", "127.0.0.1:0", 4).await.unwrap();
        let tracker = ConnectionTracker::new();

        let (_c1, peer1, slot1) = slot(&listener).await;
        let (_c2, peer2, slot2) = slot(&listener).await;
        let first = tracker.open(peer1, slot1);
        let second = tracker.open(peer2, slot2);

        assert_eq!(tracker.open_count(), 2);
        assert_ne!(first.id(), second.id());
        assert_eq!(listener.free_slots(), 2);

        drop(first);
        assert_eq!(tracker.open_count(), 1);
        drop(second);
        assert_eq!(tracker.open_count(), 0);
        assert_eq!(listener.free_slots(), 4);
    }

    #[tokio::test]
    async fn drain_returns_once_last_guard_drops() {
        let listener = Listener::bind("test", "127.0.0.1:0", 4).await.unwrap();
        let tracker = ConnectionTracker::new();
        let (_client, peer, slot) = slot(&listener).await;
        let guard = tracker.open(peer, slot);

        assert!(!tracker.drain(Duration::from_millis(50)).await);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            drop(guard);
        });
        assert!(tracker.drain(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn drain_with_nothing_open() {
        assert!(ConnectionTracker::new().drain(Duration::from_millis(10)).await);
    }
}
