//! File-based session store — persistent JSONL storage, one file per
//! session.
//!
//! Each session lives at `{dir}/{session_id}.jsonl`; each line is a
//! JSON-encoded `Message`. Simple, portable, human-inspectable, and requires
//! zero external services.

use async_trait::async_trait;
use std::path::PathBuf;
use stepwright_core::error::MemoryError;
use stepwright_core::message::Message;
use stepwright_core::session::SessionStore;
use tracing::{debug, warn};

/// A session store writing one JSONL file per session id under a base
/// directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at the given directory. The directory is
    /// created on first write.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default path: `~/.stepwright/sessions`
    pub fn default_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".stepwright").join("sessions")
    }

    /// List the ids of all persisted sessions.
    pub fn list_sessions(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".jsonl").map(|s| s.to_string())
            })
            .collect();
        ids.sort();
        ids
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", sanitize(session_id)))
    }
}

/// Keep session ids filesystem-safe: anything outside `[A-Za-z0-9_-]`
/// becomes an underscore.
fn sanitize(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, session_id: &str) -> Result<Vec<Message>, MemoryError> {
        let path = self.session_path(session_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()), // No history yet — start empty
        };

        let messages: Vec<Message> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Message>(line) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    warn!(error = %e, session = session_id, "Skipping corrupted history line");
                    None
                }
            })
            .collect();

        debug!(session = session_id, count = messages.len(), "Loaded session history");
        Ok(messages)
    }

    async fn clear(&self, session_id: &str) -> Result<(), MemoryError> {
        let path = self.session_path(session_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MemoryError::Storage(format!(
                "Failed to clear session file: {e}"
            ))),
        }
    }

    async fn append(&self, session_id: &str, messages: Vec<Message>) -> Result<(), MemoryError> {
        if messages.is_empty() {
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create session directory: {e}"))
        })?;

        let mut content = String::new();
        for message in &messages {
            let line = serde_json::to_string(message)
                .map_err(|e| MemoryError::SerializationFailed(e.to_string()))?;
            content.push_str(&line);
            content.push('\n');
        }

        let path = self.session_path(session_id);
        let existing = std::fs::read_to_string(&path).unwrap_or_default();
        std::fs::write(&path, format!("{existing}{content}"))
            .map_err(|e| MemoryError::Storage(format!("Failed to write session file: {e}")))?;

        debug!(session = session_id, count = messages.len(), "Appended session history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store() -> (FileSessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (FileSessionStore::new(dir.path().to_path_buf()), dir)
    }

    #[tokio::test]
    async fn append_and_load_persists() {
        let (store, dir) = store();
        store
            .append("budget-review", vec![Message::user("goal"), Message::assistant("done")])
            .await
            .unwrap();

        // A fresh store over the same directory sees the history
        let reopened = FileSessionStore::new(dir.path().to_path_buf());
        let history = reopened.load("budget-review").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user("goal"));
    }

    #[tokio::test]
    async fn missing_session_loads_empty() {
        let (store, _dir) = store();
        assert!(store.load("never-seen").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_history() {
        let (store, _dir) = store();
        store
            .append("s1", vec![Message::user("old history")])
            .await
            .unwrap();
        store.clear("s1").await.unwrap();
        assert!(store.load("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_of_unknown_session_is_fine() {
        let (store, _dir) = store();
        store.clear("ghost").await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_lines_are_skipped() {
        let (store, dir) = store();
        let path = dir.path().join("s1.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"kind":"user","text":"valid"}}"#).unwrap();
        writeln!(file, "this is not json").unwrap();
        writeln!(file, r#"{{"kind":"assistant","text":"also valid"}}"#).unwrap();

        let history = store.load("s1").await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn session_ids_are_sanitized() {
        let (store, dir) = store();
        store
            .append("../escape/attempt", vec![Message::user("contained")])
            .await
            .unwrap();

        // The file stays inside the store directory
        let sessions = store.list_sessions();
        assert_eq!(sessions.len(), 1);
        assert!(!sessions[0].contains('/'));
        assert!(dir.path().join(format!("{}.jsonl", sessions[0])).exists());
    }

    #[tokio::test]
    async fn list_sessions_sorted() {
        let (store, _dir) = store();
        store.append("beta", vec![Message::user("b")]).await.unwrap();
        store.append("alpha", vec![Message::user("a")]).await.unwrap();
        assert_eq!(store.list_sessions(), vec!["alpha", "beta"]);
    }
}
