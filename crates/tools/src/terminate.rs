//! The terminate sentinel — the oracle's explicit "task is complete" signal.
//!
//! The step engine watches tool responses for this name: seeing one flips
//! the run to `Finished`. The tool itself does nothing but echo the final
//! answer carried in its `reason` argument.

use async_trait::async_trait;
use stepwright_core::error::ToolError;
use stepwright_core::tool::{Tool, ToolResult, TERMINATE_TOOL};

pub struct TerminateTool;

#[async_trait]
impl Tool for TerminateTool {
    fn name(&self) -> &str {
        TERMINATE_TOOL
    }

    fn description(&self) -> &str {
        "Terminate the task when it is complete or cannot proceed further. \
         The reason must contain the full final answer for the user: a summary \
         of what was accomplished, any generated file links, and key findings \
         or recommendations."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "The complete final answer to return to the user"
                }
            },
            "required": ["reason"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let reason = arguments["reason"].as_str().unwrap_or("").to_string();
        Ok(ToolResult::ok(reason))
    }
}
