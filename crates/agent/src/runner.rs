//! The agent loop controller.
//!
//! Drives the step engine across a bounded number of iterations, enforces
//! the step budget, decides termination, synthesizes the final result, and
//! guarantees the injected finalizer runs exactly once per run — on success,
//! step-limit termination, and failure alike.
//!
//! Two execution modes:
//! - [`AgentRunner::run`] blocks the caller until completion and returns the
//!   step narratives.
//! - [`AgentRunner::run_stream`] moves the run onto a worker task and hands
//!   the caller an ordered event channel terminated by the `[DONE]`
//!   sentinel.

use std::sync::Arc;
use std::time::Duration;
use stepwright_core::error::AgentError;
use stepwright_core::message::Message;
use stepwright_core::reasoning::{ReasoningPort, ReasoningRequest, ToolSignature};
use stepwright_core::session::RunFinalizer;
use stepwright_core::state::AgentState;
use stepwright_core::tool::ToolInvocationPort;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::events::StreamEvent;
use crate::run_context::{AgentRunConfig, AgentRunContext};
use crate::step::StepEngine;

/// Pacing and deadline settings for streaming mode.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Overall deadline for a streaming run.
    pub run_timeout: Duration,

    /// Longest a single step may go without producing an event before the
    /// sink gives up on the run.
    pub idle_timeout: Duration,

    /// Characters per `result_chunk` event.
    pub chunk_size: usize,

    /// Delay between chunks, for smooth incremental delivery.
    pub chunk_delay: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            run_timeout: Duration::from_secs(300),
            idle_timeout: Duration::from_secs(120),
            chunk_size: 3,
            chunk_delay: Duration::from_millis(20),
        }
    }
}

/// A pluggable result-selection policy consulted before the built-in
/// synthesis. Returning `None` falls through to the default.
pub type ResultSelector = dyn Fn(&AgentRunContext) -> Option<String> + Send + Sync;

pub struct AgentRunner {
    ctx: AgentRunContext,
    engine: StepEngine,
    reasoner: Arc<dyn ReasoningPort>,
    finalizer: Option<Arc<dyn RunFinalizer>>,
    result_selector: Option<Box<ResultSelector>>,
    stream_settings: StreamSettings,
    finalized: bool,
}

impl AgentRunner {
    /// Create a runner for one execution of the loop.
    pub fn new(
        config: AgentRunConfig,
        reasoner: Arc<dyn ReasoningPort>,
        executor: Arc<dyn ToolInvocationPort>,
        signatures: Vec<ToolSignature>,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let engine = StepEngine::new(reasoner.clone(), executor, signatures);
        Ok(Self {
            ctx: AgentRunContext::new(&config),
            engine,
            reasoner,
            finalizer: None,
            result_selector: None,
            stream_settings: StreamSettings::default(),
            finalized: false,
        })
    }

    /// Rehydrate the run context from persisted session history.
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.ctx.log = stepwright_core::message::MessageLog::from_messages(history);
        self
    }

    /// Inject the post-run hook. Runs exactly once per run.
    pub fn with_finalizer(mut self, finalizer: Arc<dyn RunFinalizer>) -> Self {
        self.finalizer = Some(finalizer);
        self
    }

    /// Inject a result-selection policy overriding the built-in synthesis.
    pub fn with_result_selector(
        mut self,
        selector: Box<ResultSelector>,
    ) -> Self {
        self.result_selector = Some(selector);
        self
    }

    /// Override streaming pacing and deadline.
    pub fn with_stream_settings(mut self, settings: StreamSettings) -> Self {
        self.stream_settings = settings;
        self
    }

    /// The run context, for inspection after a synchronous run.
    pub fn context(&self) -> &AgentRunContext {
        &self.ctx
    }

    fn validate_start(&self, goal: &str) -> Result<(), AgentError> {
        if !self.ctx.state.can_start() {
            return Err(AgentError::InvalidState(self.ctx.state.to_string()));
        }
        if goal.trim().is_empty() {
            return Err(AgentError::EmptyGoal);
        }
        Ok(())
    }

    /// Run the loop synchronously. Returns the step-by-step narratives
    /// joined by newlines. Precondition failures (already ran, empty goal)
    /// fail the call immediately without entering the loop.
    pub async fn run(&mut self, goal: &str) -> Result<String, AgentError> {
        self.validate_start(goal)?;

        self.ctx.state = AgentState::Running;
        self.ctx.log.push(Message::user(goal));

        let results = self.run_loop(None).await;
        let output = results.join("\n");
        self.finalize_once().await;
        Ok(output)
    }

    /// Run the loop on a worker task, streaming progress events.
    ///
    /// The returned channel delivers events in production order and always
    /// ends with [`StreamEvent::Done`] — on success, step-limit termination,
    /// and failure alike. The worker owns the run context exclusively.
    pub fn run_stream(mut self, goal: impl Into<String>) -> mpsc::Receiver<StreamEvent> {
        let goal = goal.into();
        let (tx, rx) = mpsc::channel::<StreamEvent>(64);

        tokio::spawn(async move {
            let deadline = self.stream_settings.run_timeout;
            match tokio::time::timeout(deadline, self.stream_worker(&tx, &goal)).await {
                Ok(()) => {
                    // A worker that completed without flipping state would
                    // leave a resumed session inconsistent
                    if self.ctx.state == AgentState::Running {
                        self.ctx.state = AgentState::Finished;
                    }
                }
                Err(_) => {
                    self.ctx.state = AgentState::Error;
                    warn!(agent = %self.ctx.name, timeout_secs = deadline.as_secs(), "Streaming run timed out");
                    let _ = tx
                        .send(StreamEvent::Error {
                            message: format!("Run timed out after {}s", deadline.as_secs()),
                        })
                        .await;
                }
            }

            let _ = tx.send(StreamEvent::Done).await;
            self.finalize_once().await;
        });

        rx
    }

    async fn stream_worker(&mut self, tx: &mpsc::Sender<StreamEvent>, goal: &str) {
        if let Err(e) = self.validate_start(goal) {
            let _ = tx
                .send(StreamEvent::Error {
                    message: format!("Execution error: {e}"),
                })
                .await;
            return;
        }

        self.ctx.state = AgentState::Running;
        self.ctx.log.push(Message::user(goal));

        self.run_loop(Some(tx)).await;
        if self.ctx.state == AgentState::Error {
            return;
        }

        let final_text = self.final_result().await;
        if !final_text.trim().is_empty() {
            let _ = tx.send(StreamEvent::ResultStart).await;
            self.stream_result_chunks(&final_text, tx).await;
            let _ = tx.send(StreamEvent::ResultEnd).await;
        }
    }

    /// The shared step loop. With a sink attached, per-step progress events
    /// are emitted for every step that did not finish the run.
    async fn run_loop(&mut self, sink: Option<&mpsc::Sender<StreamEvent>>) -> Vec<String> {
        let max_steps = self.ctx.max_steps;
        let mut results: Vec<String> = Vec::new();

        for step in 1..=max_steps {
            if self.ctx.state == AgentState::Finished {
                break;
            }
            self.ctx.current_step = step;
            info!(agent = %self.ctx.name, "Executing step {}/{}", step, max_steps);

            // One step of budget left: nudge the oracle to wrap up now
            // rather than keep exploring past the limit
            if step + 1 == max_steps && self.ctx.state != AgentState::Finished {
                let warning = budget_warning(step, max_steps, self.engine.termination_tool());
                warn!(agent = %self.ctx.name, "Injecting step-budget warning");
                self.ctx.log.push(Message::user(warning));
            }

            // With a sink attached, a step that produces no event within the
            // idle window fails the run rather than holding the stream open
            let narrative = match sink {
                Some(tx) => {
                    let idle = self.stream_settings.idle_timeout;
                    match tokio::time::timeout(idle, self.engine.execute_step(&mut self.ctx)).await
                    {
                        Ok(narrative) => narrative,
                        Err(_) => {
                            self.ctx.state = AgentState::Error;
                            warn!(agent = %self.ctx.name, idle_secs = idle.as_secs(), "No progress within idle timeout");
                            let _ = tx
                                .send(StreamEvent::Error {
                                    message: format!(
                                        "No progress within {}s, giving up",
                                        idle.as_secs()
                                    ),
                                })
                                .await;
                            results.push(format!("Step {step}: no progress within idle timeout"));
                            break;
                        }
                    }
                }
                None => self.engine.execute_step(&mut self.ctx).await,
            };
            results.push(format!("Step {step}: {narrative}"));

            if self.ctx.state == AgentState::Finished {
                break;
            }

            if let Some(tx) = sink {
                let _ = tx
                    .send(StreamEvent::Thinking {
                        step,
                        content: narrative,
                    })
                    .await;
            }
        }

        // Budget exhausted without an answer: a designed terminal outcome
        if self.ctx.current_step >= max_steps && self.ctx.state == AgentState::Running {
            self.ctx.state = AgentState::Finished;
            results.push(format!("Terminated: reached max steps ({max_steps})"));
            if let Some(tx) = sink {
                let _ = tx
                    .send(StreamEvent::Terminate {
                        reason: format!("Reached max steps ({max_steps})"),
                    })
                    .await;
            }
        }

        results
    }

    /// Select the final result for the caller.
    ///
    /// Preference order: the injected selector, the oracle's direct answer,
    /// the most recent substantial assistant text, and only then one extra
    /// synthesis call over the full history — which must embed any collected
    /// file links verbatim and include a risk note. A failed synthesis falls
    /// back to the best previously available answer.
    pub async fn final_result(&self) -> String {
        if let Some(selector) = &self.result_selector {
            if let Some(chosen) = selector(&self.ctx) {
                return chosen;
            }
        }

        // Fast path: the oracle answered directly without ever calling a tool
        if let Some(think) = &self.ctx.last_think_result {
            if !think.is_empty() {
                return think.clone();
            }
        }

        let parent = self
            .ctx
            .log
            .last_assistant_text()
            .unwrap_or_default()
            .to_string();

        let mut has_tool_calls = false;
        let mut file_links = String::new();
        for message in self.ctx.log.messages() {
            if let Some(responses) = message.responses() {
                has_tool_calls = true;
                for response in responses {
                    if is_file_artifact(&response.name, &response.result) {
                        file_links
                            .push_str(&format!("- Tool {} result: {}\n", response.name, response.result));
                    }
                }
            }
        }

        if !has_tool_calls {
            return parent;
        }
        if parent.chars().count() > 50 && file_links.is_empty() {
            // Substantial answer and nothing to surface: skip re-summarization
            return parent;
        }

        let mut messages = self.ctx.log.messages().to_vec();
        messages.push(Message::user(synthesis_prompt(&file_links)));
        let request =
            ReasoningRequest::completion(messages, self.ctx.system_prompt.clone());

        match self.reasoner.reason(request).await {
            Ok(outcome) if !outcome.text.trim().is_empty() => outcome.text,
            Ok(_) => parent,
            Err(e) => {
                warn!(agent = %self.ctx.name, error = %e, "Final summary generation failed");
                parent
            }
        }
    }

    /// Emit the final narrative in small paced chunks. A closed sink aborts
    /// the remaining chunks cleanly.
    async fn stream_result_chunks(&self, content: &str, tx: &mpsc::Sender<StreamEvent>) {
        let chars: Vec<char> = content.chars().collect();
        for chunk in chars.chunks(self.stream_settings.chunk_size.max(1)) {
            let piece: String = chunk.iter().collect();
            if tx
                .send(StreamEvent::ResultChunk { content: piece })
                .await
                .is_err()
            {
                return;
            }
            tokio::time::sleep(self.stream_settings.chunk_delay).await;
        }
    }

    /// Run the injected finalizer, at most once, and only if the run
    /// actually started.
    async fn finalize_once(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        if self.ctx.state == AgentState::Idle {
            return;
        }
        if let Some(finalizer) = &self.finalizer {
            finalizer
                .finalize(self.ctx.log.messages(), &self.ctx.next_step_prompt)
                .await;
        }
    }
}

/// The nudge injected when exactly one step of budget remains.
fn budget_warning(step: u32, max_steps: u32, termination_tool: &str) -> String {
    format!(
        "IMPORTANT: you are on step {step} of {max_steps} and only one step remains. \
         The next step (step {max_steps}) must be your last. If the task is not finished: \
         stop gathering information, summarize the results you already have, and call the \
         `{termination_tool}` tool with your final answer on the next step. If the task is \
         already complete, call the `{termination_tool}` tool now."
    )
}

/// The instruction for the one extra synthesis call.
fn synthesis_prompt(file_links: &str) -> String {
    let file_links_info = if file_links.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nIMPORTANT: the following files were generated or downloaded during this \
             task. The answer must include these links verbatim:\n{file_links}"
        )
    };

    format!(
        "Based on the conversation and tool results above, produce the complete final \
         answer for the user.\n\n\
         Requirements:\n\
         1. Summarize all useful information gathered so far.\n\
         2. If any files were generated or downloaded, include the full preview and \
            download links in the answer.\n\
         3. Link format example: [preview](/api/file/preview?path=xxx) | \
            [download](/api/file/download?path=xxx)\n\
         4. Give actionable conclusions or recommendations.\n\
         5. Use clear formatting (Markdown is fine).\n\
         6. Include a risk disclaimer where the answer involves investment advice.\
         {file_links_info}\n\
         Answer directly, without prefacing phrases like \"Based on the above\"."
    )
}

/// Heuristic for tool results that surface a file artifact the final answer
/// should link to. Substring-based — tools signal artifacts through their
/// result text, not a structured field.
fn is_file_artifact(tool_name: &str, result: &str) -> bool {
    let name = tool_name.to_lowercase();
    name.contains("write")
        || name.contains("download")
        || name.contains("markdown")
        || result.contains("/api/file/")
        || result.contains("download")
        || result.contains("preview")
}
