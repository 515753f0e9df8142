//! Resource download tool — fetch a direct file URL into the workspace.
//!
//! Guards against the most common failure mode: a URL that serves an HTML
//! page (directory index, error page, login wall) instead of the file. Those
//! come back as guidance text the oracle can act on, not as a saved file.

use async_trait::async_trait;
use std::path::PathBuf;
use stepwright_core::error::ToolError;
use stepwright_core::tool::{Tool, ToolResult};
use tracing::debug;

use crate::download_link;
use crate::file_read::validate_file_name;

pub struct ResourceDownloadTool {
    workspace_dir: PathBuf,
    client: reqwest::Client,
}

impl ResourceDownloadTool {
    pub fn new(workspace_dir: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            workspace_dir,
            client,
        }
    }
}

/// Files under this size get content-sniffed for HTML error pages.
const SNIFF_LIMIT_BYTES: usize = 10_000;

fn looks_like_html(content: &str) -> bool {
    let trimmed = content.trim_start();
    trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || content.contains("<title>Index of /</title>")
}

#[async_trait]
impl Tool for ResourceDownloadTool {
    fn name(&self) -> &str {
        "download_resource"
    }

    fn description(&self) -> &str {
        "Download a file from a direct download URL. IMPORTANT: the URL must \
         point directly to a file (e.g. .pdf, .xlsx, .zip), not a web page. \
         If you get an HTML page error, find the actual file link first."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Direct download URL of the file (must be a file URL, not a web page)"
                },
                "file_name": {
                    "type": "string",
                    "description": "Name to save the file as (include extension, e.g. report.pdf)"
                }
            },
            "required": ["url", "file_name"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let url = arguments["url"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url' argument".into()))?;
        let file_name = arguments["file_name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_name' argument".into()))?;
        validate_file_name(file_name)?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "URL must start with http:// or https://".into(),
            ));
        }

        debug!(url, file_name, "Downloading resource");

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                return Ok(ToolResult::failed(format!(
                    "Error downloading resource: {e}"
                )))
            }
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.to_lowercase().contains("text/html") {
            return Ok(ToolResult::failed(format!(
                "Error: URL points to an HTML page, not a downloadable file.\n\
                 Content-Type: {content_type}\n\
                 This is likely a directory index or web page. Please verify the \
                 URL points directly to a file (e.g. .pdf, .zip, .xlsx)."
            )));
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return Ok(ToolResult::failed(format!(
                    "Error downloading resource: {e}"
                )))
            }
        };

        // Small payloads may still be an error page served with a generic
        // content type
        if bytes.len() < SNIFF_LIMIT_BYTES {
            if let Ok(text) = std::str::from_utf8(&bytes) {
                if looks_like_html(text) {
                    let preview: String = text.chars().take(200).collect();
                    return Ok(ToolResult::failed(format!(
                        "Error: Downloaded file is an HTML page, not the intended resource.\n\
                         The URL may be incorrect or requires authentication.\n\
                         File preview: {preview}...\n\
                         Please verify the download link is correct."
                    )));
                }
            }
        }

        let download_dir = self.workspace_dir.join("download");
        if let Err(e) = tokio::fs::create_dir_all(&download_dir).await {
            return Ok(ToolResult::failed(format!(
                "Error downloading resource: {e}"
            )));
        }
        let path = download_dir.join(file_name);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            return Ok(ToolResult::failed(format!(
                "Error downloading resource: {e}"
            )));
        }

        Ok(ToolResult::ok(format!(
            "Resource downloaded successfully!\nFile size: {} bytes\nDownload URL: {}\nPlease provide this URL to the user.",
            bytes.len(),
            download_link(&format!("download/{file_name}"))
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_sniffing() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <html lang=\"en\">"));
        assert!(looks_like_html("<head><title>Index of /</title></head>"));
        assert!(!looks_like_html("%PDF-1.7 binary stuff"));
    }

    #[tokio::test]
    async fn rejects_non_http_url() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ResourceDownloadTool::new(dir.path().to_path_buf());
        let err = tool
            .execute(serde_json::json!({
                "url": "ftp://example.com/file.pdf",
                "file_name": "file.pdf"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn rejects_path_traversal_in_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ResourceDownloadTool::new(dir.path().to_path_buf());
        let err = tool
            .execute(serde_json::json!({
                "url": "https://example.com/file.pdf",
                "file_name": "../file.pdf"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::PermissionDenied { .. }));
    }
}
