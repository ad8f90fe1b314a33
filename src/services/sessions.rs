use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use tokio::sync::Mutex as AsyncMutex;

use crate::models::{Session, SessionKey};

pub type SessionHandle = Arc<AsyncMutex<Session>>;

/// In-memory sessions keyed by channel and conversation.
///
/// Each session sits behind its own async lock; callers hold it for the whole
/// turn so a key never has two mutations in flight, while other keys proceed.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, SessionHandle>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the session for `key`, creating an idle one on first contact.
    pub fn handle(&self, key: &SessionKey) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(Session::new(self.ttl))))
            .clone()
    }

    /// Clone of the current state without starting a turn. Used for diagnostics
    /// and by tests; `None` when the key has never been seen or was evicted.
    pub async fn snapshot(&self, key: &SessionKey) -> Option<Session> {
        let handle = {
            let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            sessions.get(key).cloned()
        }?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops expired sessions.
    ///
    /// A session is kept while any caller still holds its handle: a turn that
    /// looked the key up but has not locked it yet must not end up mutating a
    /// session the map no longer knows about.
    pub fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => !session.is_expired(),
                Err(_) => true,
            }
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "evicted expired sessions");
        }
        evicted
    }

    /// Periodic eviction loop; runs until the task is dropped.
    pub async fn run_eviction(self: Arc<Self>, every: std::time::Duration) {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            self.evict_expired();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStep, LeadSource};
    use crate::services::booking;

    #[tokio::test]
    async fn test_lazy_creation_is_idle() {
        let store = SessionStore::new(Duration::minutes(30));
        let key = SessionKey::web("10.0.0.1");
        assert!(store.snapshot(&key).await.is_none());

        let handle = store.handle(&key);
        assert!(handle.lock().await.is_idle());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_same_key_shares_session() {
        let store = SessionStore::new(Duration::minutes(30));
        let key = SessionKey::telegram(42);

        store.handle(&key).lock().await.step = BookingStep::AskPhone;
        assert_eq!(store.handle(&key).lock().await.step, BookingStep::AskPhone);
    }

    #[tokio::test]
    async fn test_channels_do_not_share_sessions() {
        let store = SessionStore::new(Duration::minutes(30));
        store.handle(&SessionKey::web("42")).lock().await.step = BookingStep::AskDate;

        let tg = store.snapshot(&SessionKey::telegram(42)).await;
        assert!(tg.is_none());
        assert_eq!(store.handle(&SessionKey::telegram(42)).lock().await.step, BookingStep::Idle);
    }

    #[tokio::test]
    async fn test_evicts_expired_sessions() {
        let store = SessionStore::new(Duration::zero());
        store.handle(&SessionKey::web("a"));
        store.handle(&SessionKey::web("b"));

        assert_eq!(store.evict_expired(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_live_and_locked_sessions() {
        let store = SessionStore::new(Duration::zero());
        let busy = store.handle(&SessionKey::web("busy"));
        let _guard = busy.lock().await;

        assert_eq!(store.evict_expired(), 0);
        assert_eq!(store.len(), 1);

        let live = SessionStore::new(Duration::minutes(30));
        live.handle(&SessionKey::web("live"));
        assert_eq!(live.evict_expired(), 0);
    }

    #[tokio::test]
    async fn test_handle_held_across_eviction_keeps_session() {
        let store = SessionStore::new(Duration::zero());
        let key = SessionKey::web("10.0.0.9");

        let handle = store.handle(&key);
        assert_eq!(store.evict_expired(), 0);

        booking::begin(&mut *handle.lock().await, LeadSource::Web, None);
        drop(handle);

        let next = store.handle(&key);
        assert_eq!(next.lock().await.step, BookingStep::AskName);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_released_handle_allows_eviction() {
        let store = SessionStore::new(Duration::zero());
        let handle = store.handle(&SessionKey::web("10.0.0.10"));
        drop(handle);

        assert_eq!(store.evict_expired(), 1);
        assert!(store.snapshot(&SessionKey::web("10.0.0.10")).await.is_none());
    }
}
