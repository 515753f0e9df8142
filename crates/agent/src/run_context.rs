//! Per-run agent state.

use stepwright_core::error::AgentError;
use stepwright_core::message::{Message, MessageLog};
use stepwright_core::state::AgentState;
use stepwright_core::tool::ToolCallBatch;

/// Construction-time run configuration, immutable for the run's duration.
#[derive(Debug, Clone)]
pub struct AgentRunConfig {
    /// Display name for logging.
    pub name: String,

    /// The system prompt framing every reasoning call.
    pub system_prompt: String,

    /// A nudge appended before each think phase. Empty disables it.
    pub next_step_prompt: String,

    /// Step budget: maximum think/act cycles before forced termination.
    pub max_steps: u32,
}

impl AgentRunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: String::new(),
            next_step_prompt: String::new(),
            max_steps: 10,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_next_step_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.next_step_prompt = prompt.into();
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_steps < 1 {
            return Err(AgentError::InvalidConfig(
                "max_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The state owned exclusively by one execution of the loop.
///
/// Created per invocation — fresh, or rehydrated from persisted history —
/// mutated step by step, and discarded after compaction at run end. It is
/// never reused across runs; the runner consumes itself to make that a
/// compile-time guarantee.
#[derive(Debug)]
pub struct AgentRunContext {
    pub name: String,
    pub system_prompt: String,
    pub next_step_prompt: String,
    pub state: AgentState,
    pub current_step: u32,
    pub max_steps: u32,
    pub log: MessageLog,
    /// The oracle's direct answer, set only when a think phase finished the
    /// run without tool calls.
    pub last_think_result: Option<String>,
    /// The reasoning response awaiting execution by the act phase.
    pub pending_tool_batch: Option<ToolCallBatch>,
}

impl AgentRunContext {
    /// A fresh context with an empty log.
    pub fn new(config: &AgentRunConfig) -> Self {
        Self {
            name: config.name.clone(),
            system_prompt: config.system_prompt.clone(),
            next_step_prompt: config.next_step_prompt.clone(),
            state: AgentState::Idle,
            current_step: 0,
            max_steps: config.max_steps,
            log: MessageLog::new(),
            last_think_result: None,
            pending_tool_batch: None,
        }
    }

    /// A context rehydrated from persisted session history.
    pub fn with_history(config: &AgentRunConfig, history: Vec<Message>) -> Self {
        let mut ctx = Self::new(config);
        ctx.log = MessageLog::from_messages(history);
        ctx
    }
}
