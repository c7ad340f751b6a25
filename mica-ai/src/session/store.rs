//! In-memory session map
//!
//! All coaching sessions live behind one `tokio::sync::Mutex`. Reads hand out
//! snapshot clones; mutations run inside a synchronous closure so the lock is
//! never held across an await point.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::models::Session;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session
    pub async fn insert(&self, session: Session) {
        self.sessions.lock().await.insert(session.id, session);
    }

    /// Snapshot clone of a session
    pub async fn snapshot(&self, id: i64) -> Option<Session> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Apply `f` to a stored session, returning its result
    pub async fn mutate<T>(&self, id: i64, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(&id).map(f)
    }

    /// Return the session for `id`, creating it with `make` when absent.
    ///
    /// Uploads may arrive for ids this process never saw (another replica
    /// generated the questions, or a restart dropped the map); those sessions
    /// are created on first touch instead of being rejected.
    pub async fn ensure(&self, id: i64, make: impl FnOnce() -> Session) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(id).or_insert_with(make).clone()
    }

    /// Drop completed sessions created before the cutoff; active ones stay
    pub async fn prune_completed(&self, older_than: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - older_than;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !(s.is_completed() && s.created_at <= cutoff));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
