//! Tool trait and tool invocation port — the abstraction over agent
//! capabilities.
//!
//! Tools are what let the agent act in the world: read and write files,
//! download resources, and signal completion via the terminate sentinel.

use crate::error::ToolError;
use crate::message::{Message, MessageLog, ToolCallRequest};
use crate::reasoning::ToolSignature;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The designated tool whose invocation is the oracle's explicit signal that
/// the task is complete.
pub const TERMINATE_TOOL: &str = "terminate";

/// A request to execute a tool, with parsed arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the oracle's tool_call id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build from a wire-level request, parsing the argument string.
    /// Malformed JSON degrades to `null` arguments — the tool reports the
    /// problem in its own words instead of the call being dropped.
    pub fn from_request(request: &ToolCallRequest) -> Self {
        Self {
            id: request.id.clone(),
            name: request.name.clone(),
            arguments: serde_json::from_str(&request.arguments).unwrap_or_default(),
        }
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The core Tool trait.
///
/// Each tool (terminate, read_file, write_file, download_resource, ...)
/// implements this trait. Tools are registered in the ToolRegistry and
/// declared to the reasoning oracle as signatures.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "write_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a signature for the reasoning oracle.
    fn signature(&self) -> ToolSignature {
        ToolSignature {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The step engine uses this to:
/// 1. Get tool signatures to declare to the LLM
/// 2. Look up and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool signatures (for declaring to the LLM).
    pub fn signatures(&self) -> Vec<ToolSignature> {
        self.tools.values().map(|t| t.signature()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        tool.execute(call.arguments.clone()).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A reasoning response awaiting execution: the assistant's text plus the
/// tool calls it requested. Held by the run context between the think and
/// act phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallBatch {
    /// The assistant's textual reasoning accompanying the calls.
    pub assistant_text: String,

    /// The requested calls, in oracle order.
    pub calls: Vec<ToolCallRequest>,
}

/// The tool invocation port.
///
/// Given the current log and a pending batch, executes every call and
/// returns the updated conversation history — the assistant message and the
/// paired tool responses appended together, atomically. The act phase
/// replaces the log with the returned history.
#[async_trait]
pub trait ToolInvocationPort: Send + Sync {
    async fn execute(
        &self,
        log: &MessageLog,
        batch: &ToolCallBatch,
    ) -> std::result::Result<Vec<Message>, ToolError>;
}
