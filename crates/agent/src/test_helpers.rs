//! Shared test helpers for step and runner tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use stepwright_core::error::{ReasoningError, ToolError};
use stepwright_core::reasoning::{ReasoningOutcome, ReasoningPort, ReasoningRequest};
use stepwright_core::tool::{Tool, ToolInvocationPort, ToolRegistry, ToolResult};
use stepwright_tools::{RegistryExecutor, TerminateTool};

/// A mock reasoner that returns a sequence of scripted outcomes.
///
/// Each call to `reason` consumes the next script entry. Once the script
/// runs dry, further calls fail with a `NotConfigured` error — which is
/// exactly what the engine's recovery paths (summarization fallback, final
/// synthesis fallback) are built to absorb, so tests can script only the
/// calls they care about.
pub struct SequentialMockReasoner {
    script: Mutex<Vec<Result<ReasoningOutcome, ReasoningError>>>,
    requests: Mutex<Vec<ReasoningRequest>>,
    call_count: Mutex<usize>,
}

impl SequentialMockReasoner {
    pub fn new(script: Vec<Result<ReasoningOutcome, ReasoningError>>) -> Self {
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// A reasoner that returns a single text answer (no tool calls).
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(ReasoningOutcome::text_only(text))])
    }

    /// A reasoner whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(ReasoningError::Network(message.to_string()))])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The most recent request seen, for asserting what the engine sent.
    pub fn last_request(&self) -> Option<ReasoningRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ReasoningPort for SequentialMockReasoner {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn reason(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningOutcome, ReasoningError> {
        self.requests.lock().unwrap().push(request);
        *self.call_count.lock().unwrap() += 1;

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(ReasoningError::NotConfigured("script exhausted".into()));
        }
        script.remove(0)
    }
}

/// A tool that echoes back its `text` argument.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes back the input"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }
    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::ok(
            arguments["text"].as_str().unwrap_or("").to_string(),
        ))
    }
}

fn registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    registry.register(Box::new(TerminateTool));
    Arc::new(registry)
}

/// An executor over a registry with the echo and terminate tools.
pub fn echo_executor() -> Arc<dyn ToolInvocationPort> {
    Arc::new(RegistryExecutor::new(registry()))
}

/// Same registry; named for tests that exercise the terminate path.
pub fn terminate_executor() -> Arc<dyn ToolInvocationPort> {
    echo_executor()
}

/// An executor that always fails — for exercising act-phase recovery.
pub struct FailingExecutor;

#[async_trait]
impl ToolInvocationPort for FailingExecutor {
    async fn execute(
        &self,
        _log: &stepwright_core::message::MessageLog,
        batch: &stepwright_core::tool::ToolCallBatch,
    ) -> Result<Vec<stepwright_core::message::Message>, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: batch
                .calls
                .first()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            reason: "executor unavailable".into(),
        })
    }
}
