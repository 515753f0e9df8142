//! Streaming progress events and their wire encoding.
//!
//! The loop controller writes these to an `mpsc` sink in production order.
//! Each event renders to one wire frame: a JSON object, except the terminal
//! sentinel which is the literal `[DONE]` string. The sentinel is always
//! delivered exactly once, whether the run succeeded or failed — downstream
//! consumers key stream end off it.

use serde::{Deserialize, Serialize};

/// The literal frame that marks end of stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Events emitted by a streaming run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Per-step narrative.
    Thinking { step: u32, content: String },

    /// The step budget was exhausted.
    Terminate { reason: String },

    /// The final-answer envelope opens.
    ResultStart,

    /// One chunk of the final answer.
    ResultChunk { content: String },

    /// The final-answer envelope closes.
    ResultEnd,

    /// An error occurred; the stream still ends with the sentinel.
    Error { message: String },

    /// End of stream.
    Done,
}

impl StreamEvent {
    /// Render this event as its wire frame.
    ///
    /// String payloads come out with control characters escaped — the JSON
    /// encoder guarantees the frame stays valid on the wire.
    pub fn wire_frame(&self) -> String {
        match self {
            Self::Done => DONE_SENTINEL.to_string(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}
