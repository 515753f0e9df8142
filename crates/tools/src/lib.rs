//! Built-in tool implementations for Stepwright.
//!
//! Tools give the agent the ability to act: read and write report files,
//! download resources, and signal completion via the terminate sentinel.
//! `RegistryExecutor` adapts a [`ToolRegistry`] into the engine's tool
//! invocation port.

pub mod download;
pub mod executor;
pub mod file_read;
pub mod file_write;
pub mod terminate;

pub use download::ResourceDownloadTool;
pub use executor::RegistryExecutor;
pub use file_read::FileReadTool;
pub use file_write::FileWriteTool;
pub use terminate::TerminateTool;

use std::path::PathBuf;
use stepwright_core::tool::ToolRegistry;

/// Create a default tool registry with all built-in tools, sandboxed under
/// the given workspace directory.
pub fn default_registry(workspace_dir: PathBuf) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(TerminateTool));
    registry.register(Box::new(FileReadTool::new(workspace_dir.clone())));
    registry.register(Box::new(FileWriteTool::new(workspace_dir.clone())));
    registry.register(Box::new(ResourceDownloadTool::new(workspace_dir)));
    registry
}

/// Percent-encode a relative path for embedding in a download link.
/// Only the characters that actually appear in generated file names need
/// escaping.
pub(crate) fn encode_path(path: &str) -> String {
    path.replace('%', "%25").replace(' ', "%20").replace('?', "%3F").replace('&', "%26")
}

/// Render the download-link line appended to successful file results.
pub(crate) fn download_link(relative_path: &str) -> String {
    format!("/api/file/download?path={}", encode_path(relative_path))
}
