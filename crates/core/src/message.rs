//! Message and MessageLog domain types.
//!
//! These are the core value objects that flow through the engine: the user's
//! goal enters as a message, every think/act cycle appends to the log, and
//! the compacted log is what survives a session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tool call requested by the reasoning oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a request with a fresh call id.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// The result of executing one tool call, paired to its request by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// The request id this response answers
    pub id: String,

    /// Name of the tool that produced this response
    pub name: String,

    /// The textual result data
    pub result: String,
}

/// A single conversation turn.
///
/// Every `ToolResponses` message that follows an `Assistant` message with a
/// non-empty `tool_calls` list carries exactly one response per request id,
/// in request order. The registry executor upholds this pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// A message from the user (or a loop-internal nudge injected as one).
    User { text: String },

    /// The reasoning oracle's output: an answer, tool calls, or both.
    Assistant {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },

    /// The batched results of one act phase.
    ToolResponses { responses: Vec<ToolResponse> },
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// Create an assistant message with no tool calls.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message carrying tool calls.
    pub fn assistant_with_calls(text: impl Into<String>, tool_calls: Vec<ToolCallRequest>) -> Self {
        Self::Assistant {
            text: text.into(),
            tool_calls,
        }
    }

    /// Create a tool-responses message.
    pub fn tool_responses(responses: Vec<ToolResponse>) -> Self {
        Self::ToolResponses { responses }
    }

    /// The assistant text, if this is an assistant message.
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            Self::Assistant { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The tool responses, if this is a tool-responses message.
    pub fn responses(&self) -> Option<&[ToolResponse]> {
        match self {
            Self::ToolResponses { responses } => Some(responses),
            _ => None,
        }
    }
}

/// The agent's working memory for one run: an ordered, append-only sequence
/// of messages.
///
/// Insertion order is chronological conversation order and every consumer
/// preserves it. Nothing removes entries mid-run; the compactor operates on
/// a snapshot and produces a new sequence. The act phase may swap in the
/// updated history wholesale via [`MessageLog::replace`], which is still an
/// append-extension of the previous log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    /// Create a log pre-populated with persisted history.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the entire sequence with an updated conversation history.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// A read view of the sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Consume the log, yielding the owned sequence.
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Scan backward for the most recent assistant message with non-empty
    /// text.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter_map(|m| m.assistant_text())
            .find(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg, Message::User { text: "Hello, agent!".into() });
    }

    #[test]
    fn assistant_text_accessor() {
        let msg = Message::assistant("An answer");
        assert_eq!(msg.assistant_text(), Some("An answer"));
        assert!(Message::user("hi").assistant_text().is_none());
    }

    #[test]
    fn log_preserves_insertion_order() {
        let mut log = MessageLog::new();
        log.push(Message::user("first"));
        log.push(Message::assistant("second"));
        log.push(Message::user("third"));

        let texts: Vec<_> = log
            .messages()
            .iter()
            .map(|m| match m {
                Message::User { text } => text.as_str(),
                Message::Assistant { text, .. } => text.as_str(),
                Message::ToolResponses { .. } => "",
            })
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn replace_swaps_history() {
        let mut log = MessageLog::new();
        log.push(Message::user("goal"));

        let mut updated = log.messages().to_vec();
        updated.push(Message::assistant_with_calls(
            "",
            vec![ToolCallRequest::new("write_file", "{}")],
        ));
        updated.push(Message::tool_responses(vec![ToolResponse {
            id: "1".into(),
            name: "write_file".into(),
            result: "ok".into(),
        }]));
        log.replace(updated);

        assert_eq!(log.len(), 3);
        assert!(log.last().unwrap().responses().is_some());
    }

    #[test]
    fn last_assistant_text_skips_blank_and_tool_messages() {
        let mut log = MessageLog::new();
        log.push(Message::user("goal"));
        log.push(Message::assistant("real answer"));
        log.push(Message::assistant("   "));
        log.push(Message::tool_responses(vec![]));
        assert_eq!(log.last_assistant_text(), Some("real answer"));
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::assistant_with_calls(
            "thinking",
            vec![ToolCallRequest {
                id: "call_1".into(),
                name: "read_file".into(),
                arguments: r#"{"name":"report.md"}"#.into(),
            }],
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""kind":"assistant""#));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn user_message_serializes_without_tool_fields() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"kind":"user","text":"hi"}"#);
    }
}
