//! The step engine — one Think → Act cycle.
//!
//! `execute_step` performs exactly one reasoning call and, when that call
//! requests tools, exactly one tool-execution pass. Every failure inside a
//! step degrades to a narrative string: the loop controller treats whatever
//! comes back as a returned result, never as a fault.

use std::sync::Arc;
use stepwright_core::message::{Message, ToolResponse};
use stepwright_core::reasoning::{ReasoningPort, ReasoningRequest, ToolSignature};
use stepwright_core::state::AgentState;
use stepwright_core::tool::{ToolCallBatch, ToolInvocationPort, TERMINATE_TOOL};
use tracing::{debug, info, warn};

use crate::run_context::AgentRunContext;

/// Narrative returned when the terminate sentinel fired during the act
/// phase. No summarization happens on this path.
const COMPLETION_NARRATIVE: &str = "Task completed.";

pub struct StepEngine {
    reasoner: Arc<dyn ReasoningPort>,
    executor: Arc<dyn ToolInvocationPort>,
    signatures: Vec<ToolSignature>,
    termination_tool: String,
    /// Longest individual tool result fed to the summarizing call.
    result_truncation: usize,
}

impl StepEngine {
    pub fn new(
        reasoner: Arc<dyn ReasoningPort>,
        executor: Arc<dyn ToolInvocationPort>,
        signatures: Vec<ToolSignature>,
    ) -> Self {
        Self {
            reasoner,
            executor,
            signatures,
            termination_tool: TERMINATE_TOOL.to_string(),
            result_truncation: 500,
        }
    }

    /// Override the termination sentinel name.
    pub fn with_termination_tool(mut self, name: impl Into<String>) -> Self {
        self.termination_tool = name.into();
        self
    }

    pub fn termination_tool(&self) -> &str {
        &self.termination_tool
    }

    /// Execute one think/act cycle, returning the step narrative.
    pub async fn execute_step(&self, ctx: &mut AgentRunContext) -> String {
        let should_act = self.think(ctx).await;
        if !should_act {
            // The oracle answered directly (or the think phase degraded to a
            // no-op turn)
            return ctx
                .last_think_result
                .clone()
                .unwrap_or_else(|| "Thinking complete".to_string());
        }
        self.act(ctx).await
    }

    /// The think phase. Returns whether an act phase is needed.
    async fn think(&self, ctx: &mut AgentRunContext) -> bool {
        if !ctx.next_step_prompt.trim().is_empty() {
            ctx.log.push(Message::user(ctx.next_step_prompt.clone()));
        }

        let request = ReasoningRequest {
            messages: ctx.log.messages().to_vec(),
            system_prompt: ctx.system_prompt.clone(),
            tools: self.signatures.clone(),
            options: Default::default(),
        };

        match self.reasoner.reason(request).await {
            Ok(outcome) => {
                info!(agent = %ctx.name, "Thought: {}", outcome.text);

                if outcome.is_final() {
                    // Only a direct answer is recorded here; when tools are
                    // requested the act phase records the assistant message
                    // together with the paired responses
                    ctx.log.push(Message::assistant(outcome.text.clone()));
                    ctx.last_think_result = Some(outcome.text);
                    ctx.state = AgentState::Finished;
                    return false;
                }

                info!(
                    agent = %ctx.name,
                    count = outcome.tool_calls.len(),
                    "Oracle selected tools"
                );
                for call in &outcome.tool_calls {
                    debug!(tool = %call.name, arguments = %call.arguments, "Requested call");
                }
                ctx.pending_tool_batch = Some(ToolCallBatch {
                    assistant_text: outcome.text,
                    calls: outcome.tool_calls,
                });
                true
            }
            Err(e) => {
                warn!(agent = %ctx.name, error = %e, "Reasoning call failed");
                ctx.log.push(Message::assistant(format!(
                    "Encountered an error while processing: {e}"
                )));
                false
            }
        }
    }

    /// The act phase: execute the pending batch and narrate the results.
    async fn act(&self, ctx: &mut AgentRunContext) -> String {
        let Some(batch) = ctx.pending_tool_batch.take() else {
            return "No tool calls to execute".to_string();
        };

        match self.executor.execute(&ctx.log, &batch).await {
            Ok(history) => {
                ctx.log.replace(history);

                let responses: Vec<ToolResponse> = ctx
                    .log
                    .last()
                    .and_then(|m| m.responses())
                    .map(|r| r.to_vec())
                    .unwrap_or_default();

                if responses.iter().any(|r| r.name == self.termination_tool) {
                    ctx.state = AgentState::Finished;
                    return COMPLETION_NARRATIVE.to_string();
                }

                self.summarize_responses(&responses).await
            }
            Err(e) => {
                warn!(agent = %ctx.name, error = %e, "Act phase failed");
                format!("Error executing tools: {e}")
            }
        }
    }

    /// Produce a human-readable narrative for one act step's responses.
    ///
    /// The summarizing oracle call is best-effort: on failure, a
    /// deterministic "used tool X" listing stands in.
    async fn summarize_responses(&self, responses: &[ToolResponse]) -> String {
        if responses.is_empty() {
            return "No tools were executed".to_string();
        }

        let mut digest = String::new();
        for response in responses {
            let truncated: String = if response.result.chars().count() > self.result_truncation {
                let head: String = response.result.chars().take(self.result_truncation).collect();
                format!("{head}...")
            } else {
                response.result.clone()
            };
            digest.push_str(&format!(
                "Tool name: {}\nResult: {}\n\n",
                response.name, truncated
            ));
        }

        let prompt = format!(
            "Summarize the following tool executions in plain language.\n\n\
             Requirements:\n\
             1. Describe what the tools did in natural language.\n\
             2. Extract the key information (what was found, downloaded, or generated).\n\
             3. Skip technical detail such as raw JSON or HTML.\n\
             4. Keep it to one or two sentences.\n\
             5. Speak in the first person.\n\n\
             Tool results:\n{digest}\n\
             Summarize in one sentence:"
        );

        let request = ReasoningRequest::completion(vec![Message::user(prompt)], "");
        match self.reasoner.reason(request).await {
            Ok(outcome) if !outcome.text.trim().is_empty() => outcome.text.trim().to_string(),
            Ok(_) => digest,
            Err(e) => {
                warn!(error = %e, "Result summarization failed, using plain listing");
                responses
                    .iter()
                    .map(|r| format!("Used the {} tool", r.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}
