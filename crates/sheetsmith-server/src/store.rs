use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use sheetsmith_core::EditorSession;

/// One editor session; every operation on it is serialized by the mutex
pub type SharedSession = Arc<Mutex<EditorSession>>;

#[derive(Clone)]
struct SessionEntry {
    session: SharedSession,
    created_at: DateTime<Utc>,
}

/// Store for managing independent editor sessions
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session under a fresh id
    pub async fn insert(&self, session: EditorSession) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let shared = Arc::new(Mutex::new(session));

        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: Arc::clone(&shared),
                created_at: Utc::now(),
            },
        );
        (id, shared)
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|entry| Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Ids and creation times, oldest first
    pub async fn list(&self) -> Vec<(Uuid, DateTime<Utc>)> {
        let mut sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, entry)| (*id, entry.created_at))
            .collect();
        sessions.sort_by_key(|(_, created_at)| *created_at);
        sessions
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
