//! Registry of live WebSocket connections and their outbound queues.
//!
//! Each connection owns an unbounded mpsc queue drained by its own socket
//! task, so a stalled peer only backs up its own queue and never blocks
//! another connection's processing.

use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;

struct ConnectionHandle {
    user_id: i64,
    tx: UnboundedSender<String>,
}

pub struct ConnectionRegistry {
    /// Connection ID → outbound queue.
    connections: DashMap<String, ConnectionHandle>,
    /// User ID → their single live connection.
    user_index: DashMap<i64, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_index: DashMap::new(),
        }
    }

    /// Register a connection for a user. A user has at most one live
    /// connection: a second registration evicts the first (its queue is
    /// dropped, which ends its socket task). Returns the evicted connection
    /// ID, if any.
    pub fn register(&self, conn_id: &str, user_id: i64, tx: UnboundedSender<String>) -> Option<String> {
        let evicted = self
            .user_index
            .insert(user_id, conn_id.to_string())
            .and_then(|old_conn| self.connections.remove(&old_conn).map(|(id, _)| id));

        self.connections
            .insert(conn_id.to_string(), ConnectionHandle { user_id, tx });
        evicted
    }

    /// Remove a connection. Returns `true` if this connection was still the
    /// user's registered one — the caller then runs the user-level cleanup
    /// sequence. Returns `false` for a connection that was already evicted
    /// by a newer registration.
    pub fn unregister(&self, conn_id: &str) -> bool {
        match self.connections.remove(conn_id) {
            Some((_, handle)) => {
                self.user_index
                    .remove_if(&handle.user_id, |_, current| current == conn_id);
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self, user_id: i64) -> bool {
        self.user_index.contains_key(&user_id)
    }

    /// Queue a payload for a user's connection. Returns `false` if the user
    /// has no live connection or their queue is gone.
    pub fn send_to_user(&self, user_id: i64, payload: &str) -> bool {
        let Some(conn_id) = self.user_index.get(&user_id).map(|r| r.value().clone()) else {
            return false;
        };
        match self.connections.get(&conn_id) {
            Some(handle) => handle.tx.send(payload.to_string()).is_ok(),
            None => false,
        }
    }

    /// Deliver a payload to every connection except `exclude_user_id`'s.
    /// Individual failures are logged and do not abort the rest.
    pub fn broadcast_except(&self, exclude_user_id: i64, payload: &str) {
        for entry in self.connections.iter() {
            let handle = entry.value();
            if handle.user_id == exclude_user_id {
                continue;
            }
            if handle.tx.send(payload.to_string()).is_err() {
                tracing::debug!(
                    conn_id = %entry.key(),
                    user_id = handle.user_id,
                    "dropping broadcast to closed connection"
                );
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn send_to_user_reaches_the_registered_queue() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register("conn_a", 1, tx);

        assert!(registry.send_to_user(1, "hello"));
        assert_eq!(rx.try_recv().unwrap(), "hello");
        assert!(!registry.send_to_user(2, "nobody"));
    }

    #[test]
    fn broadcast_skips_the_excluded_user() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        registry.register("conn_a", 1, tx1);
        registry.register("conn_b", 2, tx2);

        registry.broadcast_except(1, "payload");
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), "payload");
    }

    #[test]
    fn second_registration_evicts_the_first() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();

        registry.register("conn_old", 1, tx1);
        let evicted = registry.register("conn_new", 1, tx2);
        assert_eq!(evicted.as_deref(), Some("conn_old"));

        // The old queue is closed; traffic goes to the new connection.
        assert!(registry.send_to_user(1, "hi"));
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), "hi");

        // The evicted connection must not run user-level cleanup.
        assert!(!registry.unregister("conn_old"));
        assert!(registry.is_connected(1));
    }

    #[test]
    fn unregister_clears_the_user_index() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register("conn_a", 1, tx);

        assert!(registry.unregister("conn_a"));
        assert!(!registry.is_connected(1));
        assert!(!registry.send_to_user(1, "gone"));
    }
}
