//! Session registry and broadcast dispatcher
//!
//! Live websocket connections are bound to exactly one session. Dispatch
//! serializes an event once and delivers it to every connection bound to
//! the target session, best-effort with no acknowledgement. Senders whose
//! receiving task has gone away are pruned during dispatch.

use crate::events::GatewayEvent;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Opaque handle for one bound connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type SessionConnections = HashMap<ConnectionId, mpsc::UnboundedSender<String>>;

/// Maps session ids to their live connections
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionConnections>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection's outbound channel to a session
    pub async fn bind(
        &self,
        session_id: &str,
        sender: mpsc::UnboundedSender<String>,
    ) -> ConnectionId {
        let id = ConnectionId::new();
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .insert(id, sender);
        id
    }

    /// Remove a connection; drops the session entry when it was the last one
    pub async fn unbind(&self, session_id: &str, connection_id: ConnectionId) {
        let mut sessions = self.sessions.write().await;
        if let Some(connections) = sessions.get_mut(session_id) {
            connections.remove(&connection_id);
            if connections.is_empty() {
                sessions.remove(session_id);
            }
        }
    }

    /// Deliver an event to every connection bound to the session.
    ///
    /// Returns how many connections the frame was queued to. Connections
    /// bound to other sessions never see it.
    pub async fn dispatch(&self, session_id: &str, event: &GatewayEvent) -> usize {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize event for dispatch");
                return 0;
            }
        };

        let mut sessions = self.sessions.write().await;
        let Some(connections) = sessions.get_mut(session_id) else {
            return 0;
        };

        let mut delivered = 0;
        connections.retain(|_, sender| match sender.send(frame.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => false,
        });
        if connections.is_empty() {
            sessions.remove(session_id);
        }
        delivered
    }

    /// Deliver an event to every connection of every session
    pub async fn broadcast(&self, event: &GatewayEvent) -> usize {
        let session_ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        let mut delivered = 0;
        for session_id in session_ids {
            delivered += self.dispatch(&session_id, event).await;
        }
        delivered
    }

    /// Live connections bound to a session
    pub async fn connection_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Number of sessions with at least one live connection
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_reaches_only_bound_session() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.bind("sess-a", tx_a).await;
        registry.bind("sess-b", tx_b).await;

        let delivered = registry
            .dispatch("sess-a", &GatewayEvent::hello("sess-a"))
            .await;
        assert_eq!(delivered, 1);

        let frame = rx_a.recv().await.unwrap();
        assert!(frame.contains("\"hello\""));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_fans_out_within_session() {
        let registry = SessionRegistry::new();
        let (tx_1, mut rx_1) = mpsc::unbounded_channel();
        let (tx_2, mut rx_2) = mpsc::unbounded_channel();
        registry.bind("sess-a", tx_1).await;
        registry.bind("sess-a", tx_2).await;

        let delivered = registry
            .dispatch("sess-a", &GatewayEvent::security_event("probe", "test"))
            .await;
        assert_eq!(delivered, 2);
        assert!(rx_1.recv().await.is_some());
        assert!(rx_2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_per_session_ordering_follows_dispatch_order() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.bind("sess-a", tx).await;

        for i in 0..3 {
            registry
                .dispatch(
                    "sess-a",
                    &GatewayEvent::security_event("seq", format!("{}", i)),
                )
                .await;
        }
        for i in 0..3 {
            let frame = rx.recv().await.unwrap();
            assert!(frame.contains(&format!("\"detail\":\"{}\"", i)));
        }
    }

    #[tokio::test]
    async fn test_dead_senders_are_pruned() {
        let registry = SessionRegistry::new();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        registry.bind("sess-a", tx_dead).await;
        registry.bind("sess-a", tx_live).await;
        drop(rx_dead);

        let delivered = registry
            .dispatch("sess-a", &GatewayEvent::hello("sess-a"))
            .await;
        assert_eq!(delivered, 1);
        assert_eq!(registry.connection_count("sess-a").await, 1);
        assert!(rx_live.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unbind_removes_connection_and_empty_session() {
        let registry = SessionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.bind("sess-a", tx).await;
        assert_eq!(registry.session_count().await, 1);

        registry.unbind("sess-a", id).await;
        assert_eq!(registry.session_count().await, 0);
        assert_eq!(registry.connection_count("sess-a").await, 0);
    }

    #[tokio::test]
    async fn test_dispatch_to_unknown_session_is_noop() {
        let registry = SessionRegistry::new();
        let delivered = registry
            .dispatch("ghost", &GatewayEvent::hello("ghost"))
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_sessions() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry.bind("sess-a", tx_a).await;
        registry.bind("sess-b", tx_b).await;

        let delivered = registry
            .broadcast(&GatewayEvent::security_incident("lockdown", "drill"))
            .await;
        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }
}
