//! In-memory session store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stepwright_core::error::MemoryError;
use stepwright_core::message::Message;
use stepwright_core::session::SessionStore;
use tokio::sync::RwLock;

/// A session store backed by a HashMap. Nothing survives process exit.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Vec<Message>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self, session_id: &str) -> Result<Vec<Message>, MemoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn append(&self, session_id: &str, messages: Vec<Message>) -> Result<(), MemoryError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .extend(messages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_loads_empty() {
        let store = InMemorySessionStore::new();
        assert!(store.load("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_then_load_roundtrip() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", vec![Message::user("hello")])
            .await
            .unwrap();
        store
            .append("s1", vec![Message::assistant("hi")])
            .await
            .unwrap();

        let history = store.load("s1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user("hello"));
    }

    #[tokio::test]
    async fn clear_then_append_replaces() {
        let store = InMemorySessionStore::new();
        store
            .append("s1", vec![Message::user("old")])
            .await
            .unwrap();
        store.clear("s1").await.unwrap();
        store
            .append("s1", vec![Message::user("new")])
            .await
            .unwrap();

        let history = store.load("s1").await.unwrap();
        assert_eq!(history, vec![Message::user("new")]);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        store.append("a", vec![Message::user("for a")]).await.unwrap();
        store.append("b", vec![Message::user("for b")]).await.unwrap();

        assert_eq!(store.load("a").await.unwrap().len(), 1);
        assert_eq!(store.load("b").await.unwrap().len(), 1);
        assert_eq!(store.session_count().await, 2);
    }
}
