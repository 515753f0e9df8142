//! The stock run finalizer: compact the log, then replace the session's
//! stored history.

use async_trait::async_trait;
use std::sync::Arc;
use stepwright_core::message::Message;
use stepwright_core::session::{RunFinalizer, SessionStore};
use tracing::{info, warn};

use crate::compactor::{compact, CompactionPolicy};

/// Persists a run's compacted history into a [`SessionStore`] under a fixed
/// session id, with a clear-then-append replacement discipline — the stored
/// history is the compacted whole-run log, never a partial merge.
pub struct SessionPersistence {
    store: Arc<dyn SessionStore>,
    session_id: String,
    policy: CompactionPolicy,
}

impl SessionPersistence {
    pub fn new(store: Arc<dyn SessionStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
            policy: CompactionPolicy::default(),
        }
    }

    /// Override the compaction policy.
    pub fn with_policy(mut self, policy: CompactionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl RunFinalizer for SessionPersistence {
    async fn finalize(&self, messages: &[Message], next_step_prompt: &str) {
        let compacted = compact(messages, next_step_prompt, &self.policy);

        if let Err(e) = self.store.clear(&self.session_id).await {
            warn!(session = %self.session_id, error = %e, "Failed to clear session before save");
            return;
        }
        match self.store.append(&self.session_id, compacted.clone()).await {
            Ok(()) => info!(
                session = %self.session_id,
                retained = compacted.len(),
                "Saved compacted session history"
            ),
            Err(e) => warn!(session = %self.session_id, error = %e, "Failed to save session history"),
        }
    }
}
