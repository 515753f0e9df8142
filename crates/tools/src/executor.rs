//! Registry-backed tool invocation port.
//!
//! Executes a pending tool-call batch against a [`ToolRegistry`] and returns
//! the updated conversation history: the assistant message carrying the
//! calls and the paired tool responses, appended together. The pairing
//! invariant — exactly one response per request id, in request order — is
//! upheld here: tool failures become response text, never missing responses.

use async_trait::async_trait;
use std::sync::Arc;
use stepwright_core::error::ToolError;
use stepwright_core::message::{Message, MessageLog, ToolResponse};
use stepwright_core::tool::{ToolCall, ToolCallBatch, ToolInvocationPort, ToolRegistry};
use tracing::{debug, warn};

pub struct RegistryExecutor {
    registry: Arc<ToolRegistry>,
}

impl RegistryExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ToolInvocationPort for RegistryExecutor {
    async fn execute(
        &self,
        log: &MessageLog,
        batch: &ToolCallBatch,
    ) -> std::result::Result<Vec<Message>, ToolError> {
        let mut history = log.messages().to_vec();
        history.push(Message::assistant_with_calls(
            batch.assistant_text.clone(),
            batch.calls.clone(),
        ));

        let mut responses = Vec::with_capacity(batch.calls.len());
        for request in &batch.calls {
            let call = ToolCall::from_request(request);
            let start = std::time::Instant::now();
            let result = self.registry.execute(&call).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let output = match result {
                Ok(tool_result) => {
                    debug!(
                        tool = %request.name,
                        success = tool_result.success,
                        duration_ms,
                        "Tool executed"
                    );
                    tool_result.output
                }
                Err(e) => {
                    warn!(tool = %request.name, error = %e, "Tool execution failed");
                    format!("Error: {e}")
                }
            };

            responses.push(ToolResponse {
                id: request.id.clone(),
                name: request.name.clone(),
                result: output,
            });
        }

        history.push(Message::tool_responses(responses));
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwright_core::message::ToolCallRequest;
    use stepwright_core::tool::{Tool, ToolResult};

    struct UppercaseTool;

    #[async_trait]
    impl Tool for UppercaseTool {
        fn name(&self) -> &str {
            "uppercase"
        }
        fn description(&self) -> &str {
            "Uppercases the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<ToolResult, ToolError> {
            let text = arguments["text"].as_str().unwrap_or("");
            Ok(ToolResult::ok(text.to_uppercase()))
        }
    }

    fn executor() -> RegistryExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(UppercaseTool));
        RegistryExecutor::new(Arc::new(registry))
    }

    fn batch(calls: Vec<ToolCallRequest>) -> ToolCallBatch {
        ToolCallBatch {
            assistant_text: "working on it".into(),
            calls,
        }
    }

    #[tokio::test]
    async fn appends_assistant_and_responses_atomically() {
        let mut log = MessageLog::new();
        log.push(Message::user("goal"));

        let request = ToolCallRequest {
            id: "c1".into(),
            name: "uppercase".into(),
            arguments: r#"{"text":"hi"}"#.into(),
        };
        let history = executor()
            .execute(&log, &batch(vec![request]))
            .await
            .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[1].assistant_text(), Some("working on it"));
        let responses = history[2].responses().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, "c1");
        assert_eq!(responses[0].result, "HI");
    }

    #[tokio::test]
    async fn pairs_every_request_in_order() {
        let log = MessageLog::new();
        let calls: Vec<ToolCallRequest> = (0..3)
            .map(|i| ToolCallRequest {
                id: format!("c{i}"),
                name: "uppercase".into(),
                arguments: format!(r#"{{"text":"v{i}"}}"#),
            })
            .collect();

        let history = executor().execute(&log, &batch(calls)).await.unwrap();
        let responses = history.last().unwrap().responses().unwrap();
        let ids: Vec<_> = responses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_response() {
        let log = MessageLog::new();
        let request = ToolCallRequest {
            id: "c1".into(),
            name: "no_such_tool".into(),
            arguments: "{}".into(),
        };
        let history = executor()
            .execute(&log, &batch(vec![request]))
            .await
            .unwrap();

        let responses = history.last().unwrap().responses().unwrap();
        assert_eq!(responses.len(), 1);
        assert!(responses[0].result.starts_with("Error:"));
        assert!(responses[0].result.contains("no_such_tool"));
    }

    #[tokio::test]
    async fn original_log_is_untouched() {
        let mut log = MessageLog::new();
        log.push(Message::user("goal"));

        let request = ToolCallRequest {
            id: "c1".into(),
            name: "uppercase".into(),
            arguments: "{}".into(),
        };
        let _ = executor().execute(&log, &batch(vec![request])).await.unwrap();
        assert_eq!(log.len(), 1);
    }
}
