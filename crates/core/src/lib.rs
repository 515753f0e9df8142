//! # Stepwright Core
//!
//! Domain types, traits, and error definitions for the Stepwright agent
//! execution engine. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The engine, not the reasoning oracle, owns the think/act control flow.
//! Every external collaborator — the LLM backend, tool execution, session
//! persistence — is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod reasoning;
pub mod session;
pub mod state;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, Error, MemoryError, ReasoningError, Result, ToolError};
pub use message::{Message, MessageLog, ToolCallRequest, ToolResponse};
pub use reasoning::{ReasoningOptions, ReasoningOutcome, ReasoningPort, ReasoningRequest, ToolSignature};
pub use session::{RunFinalizer, SessionStore};
pub use state::AgentState;
pub use tool::{Tool, ToolCall, ToolCallBatch, ToolInvocationPort, ToolRegistry, ToolResult, TERMINATE_TOOL};
