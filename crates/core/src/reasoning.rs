//! Reasoning port — the abstraction over LLM backends.
//!
//! A `ReasoningPort` takes the conversation so far, a system prompt, and the
//! declared tool signatures, and returns either a final textual answer or a
//! set of tool calls to perform. The engine drives the think/act loop itself;
//! the port never executes tools on its own.
//!
//! Implementations: any OpenAI-compatible endpoint (see `stepwright-providers`),
//! scripted mocks for tests.

use crate::error::ReasoningError;
use crate::message::{Message, ToolCallRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tool signature sent to the LLM so it knows what tools it can request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSignature {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// Per-call options for a reasoning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningOptions {
    /// Whether the backend may execute tool calls itself. The engine always
    /// sets this to `false`: tool-call intents come back unexecuted and the
    /// step loop stays in the engine's hands.
    #[serde(default)]
    pub auto_execute_tools: bool,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for ReasoningOptions {
    fn default() -> Self {
        Self {
            auto_execute_tools: false,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// One reasoning request: the full message log plus the call context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningRequest {
    /// The conversation messages, in chronological order.
    pub messages: Vec<Message>,

    /// The system prompt framing the conversation.
    pub system_prompt: String,

    /// Tools the model may request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSignature>,

    /// Call options.
    #[serde(default)]
    pub options: ReasoningOptions,
}

impl ReasoningRequest {
    /// A plain completion request: no tools declared.
    pub fn completion(messages: Vec<Message>, system_prompt: impl Into<String>) -> Self {
        Self {
            messages,
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
            options: ReasoningOptions::default(),
        }
    }
}

/// The oracle's decision: a textual answer, tool-call intents, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReasoningOutcome {
    /// The textual part of the answer (may be empty when only tools are
    /// requested).
    pub text: String,

    /// Tool calls the model wants performed before it continues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ReasoningOutcome {
    /// A pure text answer.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Whether this outcome is a final answer (no tool calls requested).
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// The core reasoning trait.
///
/// The step engine calls `reason()` without knowing which backend is in use.
#[async_trait]
pub trait ReasoningPort: Send + Sync {
    /// A human-readable name for this backend (e.g., "openrouter").
    fn name(&self) -> &str;

    /// Send a request and get the next reasoning decision.
    async fn reason(
        &self,
        request: ReasoningRequest,
    ) -> std::result::Result<ReasoningOutcome, ReasoningError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_engine_owned_loop() {
        let opts = ReasoningOptions::default();
        assert!(!opts.auto_execute_tools);
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn completion_request_declares_no_tools() {
        let req = ReasoningRequest::completion(vec![Message::user("summarize")], "You are concise.");
        assert!(req.tools.is_empty());
        assert!(!req.options.auto_execute_tools);
    }

    #[test]
    fn outcome_finality() {
        assert!(ReasoningOutcome::text_only("done").is_final());
        let outcome = ReasoningOutcome {
            text: String::new(),
            tool_calls: vec![ToolCallRequest::new("read_file", "{}")],
        };
        assert!(!outcome.is_final());
    }

    #[test]
    fn tool_signature_serialization() {
        let sig = ToolSignature {
            name: "write_file".into(),
            description: "Write content to a file".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "content": { "type": "string" }
                },
                "required": ["name", "content"]
            }),
        };
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.contains("write_file"));
        assert!(json.contains("required"));
    }
}
