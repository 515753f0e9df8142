//! History compaction — the deterministic reduction of a full run log into
//! a smaller, persistable form.
//!
//! Raw run logs carry loop-internal nudges, terminate-sentinel bookkeeping,
//! and multi-kilobyte tool payloads. None of that belongs in the history a
//! resumed session is rehydrated from. `compact` filters and truncates a
//! snapshot of the log; the live log is never mutated.
//!
//! The transform is pure: the same input always yields the same output.

use stepwright_core::message::{Message, ToolCallRequest, ToolResponse};
use stepwright_core::tool::TERMINATE_TOOL;

/// Marker appended to any payload cut short by compaction.
pub const ELISION_MARKER: &str = "...[truncated]";

/// Replacement for tool results that carry a known failure signature.
pub const FAILED_REQUEST_PLACEHOLDER: &str = "[request failed]";

/// Result payloads containing any of these markers are block pages or
/// transport failures — persisting their full text would only pollute the
/// rehydrated context.
const FAILURE_SIGNATURES: &[&str] = &[
    "Error downloading resource",
    "Error: URL points to an HTML page",
    "security verification",
    "network is unreachable",
];

/// Tunable limits for the compaction transform.
#[derive(Debug, Clone)]
pub struct CompactionPolicy {
    /// How many messages survive, counted from the end.
    pub max_retained_messages: usize,

    /// Longest tool result kept verbatim, in characters.
    pub tool_result_truncation: usize,

    /// Longest tool-call argument payload kept verbatim, in characters.
    pub tool_argument_truncation: usize,

    /// The sentinel tool whose calls and responses are elided entirely.
    pub termination_tool: String,
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            max_retained_messages: 20,
            tool_result_truncation: 500,
            tool_argument_truncation: 200,
            termination_tool: TERMINATE_TOOL.to_string(),
        }
    }
}

/// Reduce a run log snapshot to its persistable form.
///
/// Applied in log order:
/// - user messages that exactly echo the trimmed `next_step_prompt` are
///   dropped (loop-internal nudges, not user content)
/// - assistant messages whose only tool call is the termination sentinel are
///   dropped; surviving over-length call arguments are truncated
/// - tool-response messages lose their termination-sentinel responses;
///   failure-signature payloads become [`FAILED_REQUEST_PLACEHOLDER`];
///   over-length results are truncated; emptied messages are dropped
/// - finally only the last `max_retained_messages` entries are kept
pub fn compact(
    messages: &[Message],
    next_step_prompt: &str,
    policy: &CompactionPolicy,
) -> Vec<Message> {
    let nudge = next_step_prompt.trim();
    let mut kept: Vec<Message> = Vec::with_capacity(messages.len());

    for message in messages {
        match message {
            Message::User { text } => {
                if !nudge.is_empty() && text.trim() == nudge {
                    continue;
                }
                kept.push(message.clone());
            }

            Message::Assistant { text, tool_calls } => {
                if tool_calls.len() == 1 && tool_calls[0].name == policy.termination_tool {
                    continue;
                }
                if tool_calls.is_empty() {
                    kept.push(message.clone());
                    continue;
                }
                let truncated_calls: Vec<ToolCallRequest> = tool_calls
                    .iter()
                    .map(|call| ToolCallRequest {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments: truncate_with_marker(
                            &call.arguments,
                            policy.tool_argument_truncation,
                        ),
                    })
                    .collect();
                kept.push(Message::Assistant {
                    text: text.clone(),
                    tool_calls: truncated_calls,
                });
            }

            Message::ToolResponses { responses } => {
                if responses
                    .iter()
                    .all(|r| r.name == policy.termination_tool)
                {
                    continue;
                }
                let survivors: Vec<ToolResponse> = responses
                    .iter()
                    .filter(|r| r.name != policy.termination_tool)
                    .map(|r| {
                        let mut result = r.result.clone();
                        if FAILURE_SIGNATURES.iter().any(|sig| result.contains(sig)) {
                            result = FAILED_REQUEST_PLACEHOLDER.to_string();
                        }
                        ToolResponse {
                            id: r.id.clone(),
                            name: r.name.clone(),
                            result: truncate_with_marker(&result, policy.tool_result_truncation),
                        }
                    })
                    .collect();
                if !survivors.is_empty() {
                    kept.push(Message::tool_responses(survivors));
                }
            }
        }
    }

    if kept.len() > policy.max_retained_messages {
        kept.drain(..kept.len() - policy.max_retained_messages);
    }
    kept
}

/// Truncate to `limit` characters, appending the elision marker when
/// anything was cut. Character-based so multi-byte text never splits.
fn truncate_with_marker(payload: &str, limit: usize) -> String {
    if payload.chars().count() <= limit {
        return payload.to_string();
    }
    let mut truncated: String = payload.chars().take(limit).collect();
    truncated.push_str(ELISION_MARKER);
    truncated
}
