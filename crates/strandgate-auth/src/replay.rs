//! Replay guard
//!
//! Tracks consumed token ids (jti) so a bearer token authorizes at most
//! one protected HTTP request within its validity window. Check and
//! insert happen under a single write lock, so two concurrent requests
//! presenting the same jti cannot both pass. A periodic sweep discards
//! entries whose token has expired anyway; the sweep is cleanup only and
//! rejection authority rests with the map content.

use crate::error::{AuthError, AuthResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default interval between sweeps of expired jti entries
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Tracks consumed jti values until their tokens expire
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    // jti -> token expiry (unix seconds)
    consumed: Arc<RwLock<HashMap<String, i64>>>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically consume a jti.
    ///
    /// The first call for a given jti succeeds and records it until
    /// `expires_at`; any further call before expiry fails with
    /// `replay_detected`.
    pub async fn consume(&self, jti: &str, expires_at: i64) -> AuthResult<()> {
        let mut consumed = self.consumed.write().await;
        if consumed.contains_key(jti) {
            return Err(AuthError::ReplayDetected);
        }
        consumed.insert(jti.to_string(), expires_at);
        Ok(())
    }

    /// Whether a jti has been consumed (read-only, used by the websocket
    /// handshake which validates without consuming)
    pub async fn is_consumed(&self, jti: &str) -> bool {
        self.consumed.read().await.contains_key(jti)
    }

    /// Drop entries whose token has expired. Returns how many were removed.
    pub async fn sweep_expired(&self, now: i64) -> usize {
        let mut consumed = self.consumed.write().await;
        let before = consumed.len();
        consumed.retain(|_, expires_at| *expires_at > now);
        before - consumed.len()
    }

    /// Number of currently tracked jti entries
    pub async fn len(&self) -> usize {
        self.consumed.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.consumed.read().await.is_empty()
    }

    /// Run the sweep loop until the task is aborted
    pub async fn run_sweeper(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().timestamp();
            let removed = self.sweep_expired(now).await;
            if removed > 0 {
                tracing::debug!(removed, "swept expired replay-guard entries");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_consume_succeeds_second_fails() {
        let guard = ReplayGuard::new();
        let far_future = chrono::Utc::now().timestamp() + 3600;
        guard.consume("jti-1", far_future).await.unwrap();
        assert!(matches!(
            guard.consume("jti-1", far_future).await,
            Err(AuthError::ReplayDetected)
        ));
    }

    #[tokio::test]
    async fn test_distinct_jtis_do_not_interfere() {
        let guard = ReplayGuard::new();
        let far_future = chrono::Utc::now().timestamp() + 3600;
        guard.consume("jti-a", far_future).await.unwrap();
        guard.consume("jti-b", far_future).await.unwrap();
        assert_eq!(guard.len().await, 2);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let guard = ReplayGuard::new();
        let now = chrono::Utc::now().timestamp();
        guard.consume("stale", now - 10).await.unwrap();
        guard.consume("fresh", now + 3600).await.unwrap();

        let removed = guard.sweep_expired(now).await;
        assert_eq!(removed, 1);
        assert!(!guard.is_consumed("stale").await);
        assert!(guard.is_consumed("fresh").await);
    }

    #[tokio::test]
    async fn test_concurrent_consume_admits_exactly_one() {
        let guard = ReplayGuard::new();
        let far_future = chrono::Utc::now().timestamp() + 3600;
        let mut handles = Vec::new();
        for _ in 0..16 {
            let g = guard.clone();
            handles.push(tokio::spawn(
                async move { g.consume("contended", far_future).await },
            ));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
