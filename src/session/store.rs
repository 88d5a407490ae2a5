use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::SessionError;

/// Sessions untouched for this long are dropped by [`MemoryStore::new`].
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Key/value storage for sessions, addressed by session id.
///
/// Every method is a single atomic operation so concurrent requests from the
/// same browser cannot interleave a read-modify-write.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError>;

    async fn insert(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError>;

    async fn remove(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError>;

    /// Drops every key stored for the session.
    async fn clear(&self, session_id: &str) -> Result<(), SessionError>;

    /// Drops sessions nobody has used for longer than the idle timeout and
    /// returns how many were removed.
    async fn purge_idle(&self) -> Result<usize, SessionError>;
}

#[derive(Debug)]
struct Entry {
    data: HashMap<String, Value>,
    last_seen: Instant,
}

/// In-process session backend. Data is lost when the process exits.
///
/// Session cookies live as long as the browser does, so the server cannot
/// tell when one is gone for good. Entries idle for longer than the
/// configured timeout count as abandoned: they read as empty and are
/// removed by [`purge_idle`](SessionStore::purge_idle).
#[derive(Debug)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        MemoryStore {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Number of sessions currently holding at least one key, idle or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) > self.idle_timeout
    }

    /// Returns the live entry for `session_id` and marks it as used.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<String, Entry>,
        session_id: &str,
    ) -> Option<&'a mut Entry> {
        let now = Instant::now();
        if sessions
            .get(session_id)
            .is_some_and(|entry| self.is_idle(entry, now))
        {
            sessions.remove(session_id);
            return None;
        }

        let entry = sessions.get_mut(session_id)?;
        entry.last_seen = now;
        Some(entry)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        Ok(self
            .touch(&mut sessions, session_id)
            .and_then(|entry| entry.data.get(key))
            .cloned())
    }

    async fn insert(&self, session_id: &str, key: &str, value: Value) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        match self.touch(&mut sessions, session_id) {
            Some(entry) => {
                entry.data.insert(key.to_string(), value);
            }
            None => {
                let data = HashMap::from([(key.to_string(), value)]);
                sessions.insert(
                    session_id.to_string(),
                    Entry {
                        data,
                        last_seen: Instant::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<Option<Value>, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let Some(entry) = self.touch(&mut sessions, session_id) else {
            return Ok(None);
        };

        let removed = entry.data.remove(key);
        if entry.data.is_empty() {
            sessions.remove(session_id);
        }
        Ok(removed)
    }

    async fn clear(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.lock().await.remove(session_id);
        Ok(())
    }

    async fn purge_idle(&self) -> Result<usize, SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_idle(entry, now));
        Ok(before - sessions.len())
    }
}
