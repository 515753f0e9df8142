//! Error types for the Stepwright domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Stepwright operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Agent lifecycle errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Reasoning errors ---
    #[error("Reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Run precondition failures. These fail the call immediately and never
/// enter the step loop.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Cannot run agent from state: {0}")]
    InvalidState(String),

    #[error("Cannot run agent with an empty goal")]
    EmptyGoal,

    #[error("Invalid run configuration: {0}")]
    InvalidConfig(String),
}

/// Failures talking to the reasoning oracle. The step engine recovers
/// from these locally — they never abort a run on their own.
#[derive(Debug, Clone, Error)]
pub enum ReasoningError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_error_displays_correctly() {
        let err = Error::Agent(AgentError::InvalidState("running".into()));
        assert!(err.to_string().contains("running"));
    }

    #[test]
    fn reasoning_error_displays_correctly() {
        let err = Error::Reasoning(ReasoningError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "download_resource".into(),
            reason: "connection refused".into(),
        });
        assert!(err.to_string().contains("download_resource"));
        assert!(err.to_string().contains("connection refused"));
    }
}
