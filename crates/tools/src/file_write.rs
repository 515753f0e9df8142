//! File write tool — write report files into the agent workspace.
//!
//! Successful writes return a download link so the final answer can surface
//! the generated file to the user.

use async_trait::async_trait;
use std::path::PathBuf;
use stepwright_core::error::ToolError;
use stepwright_core::tool::{Tool, ToolResult};

use crate::download_link;
use crate::file_read::validate_file_name;

pub struct FileWriteTool {
    workspace_dir: PathBuf,
}

impl FileWriteTool {
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file in the agent workspace. Creates the file if \
         it doesn't exist, overwrites if it does. Returns a download link to \
         include in the final answer."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the file to write (include extension, e.g. report.md)"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["name", "content"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let name = arguments["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;
        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;
        validate_file_name(name)?;

        let file_dir = self.workspace_dir.join("file");
        if let Err(e) = tokio::fs::create_dir_all(&file_dir).await {
            return Ok(ToolResult::failed(format!(
                "Failed to create directory: {e}"
            )));
        }

        let path = file_dir.join(name);
        match tokio::fs::write(&path, content).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "File written successfully!\nDownload URL: {}\nPlease provide this URL to the user.",
                download_link(&format!("file/{name}"))
            ))),
            Err(e) => Ok(ToolResult::failed(format!("Error writing to file: {e}"))),
        }
    }
}
