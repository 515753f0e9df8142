//! File read tool — read report files from the agent workspace.

use async_trait::async_trait;
use std::path::PathBuf;
use stepwright_core::error::ToolError;
use stepwright_core::tool::{Tool, ToolResult};

pub struct FileReadTool {
    workspace_dir: PathBuf,
}

impl FileReadTool {
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }
}

/// Reject names that would step outside the workspace.
pub(crate) fn validate_file_name(name: &str) -> Result<(), ToolError> {
    if name.is_empty() {
        return Err(ToolError::InvalidArguments("File name is empty".into()));
    }
    if name.contains("..") || name.starts_with('/') || name.starts_with('\\') {
        return Err(ToolError::PermissionDenied {
            tool_name: "file".into(),
            reason: format!("Path escapes the workspace: {name}"),
        });
    }
    Ok(())
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read content from a file in the agent workspace."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the file to read"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let name = arguments["name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;
        validate_file_name(name)?;

        let path = self.workspace_dir.join("file").join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(e) => Ok(ToolResult::failed(format!("Error reading file: {e}"))),
        }
    }
}
