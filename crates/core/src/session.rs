//! Session persistence traits.
//!
//! A `SessionStore` keeps conversation history across independent runs,
//! keyed by session id. The store only ever sees *compacted* history — the
//! run finalizer reduces the raw log before persisting it, with a
//! clear-then-append replacement discipline (no partial merge).

use crate::error::MemoryError;
use crate::message::Message;
use async_trait::async_trait;

/// Persistent storage of per-session conversation history.
///
/// Implementations: JSONL file per session, in-memory (for testing).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Load the persisted history for a session. Unknown sessions yield an
    /// empty history, not an error.
    async fn load(&self, session_id: &str) -> std::result::Result<Vec<Message>, MemoryError>;

    /// Remove all persisted history for a session.
    async fn clear(&self, session_id: &str) -> std::result::Result<(), MemoryError>;

    /// Append messages to a session's history.
    async fn append(
        &self,
        session_id: &str,
        messages: Vec<Message>,
    ) -> std::result::Result<(), MemoryError>;
}

/// A post-run hook, injected at construction, that the loop controller runs
/// exactly once per run — on success, step-limit termination, and failure
/// alike.
///
/// The stock implementation compacts the log and replaces the session's
/// stored history. Finalization is infallible from the engine's point of
/// view: implementations log their own failures.
#[async_trait]
pub trait RunFinalizer: Send + Sync {
    async fn finalize(&self, messages: &[Message], next_step_prompt: &str);
}
