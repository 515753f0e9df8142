//! Configuration loading, validation, and management for Stepwright.
//!
//! Loads configuration from `~/.stepwright/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.stepwright/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the reasoning backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Agent run settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// Streaming pacing and deadline settings
    #[serde(default)]
    pub stream: StreamConfig,

    /// History compaction settings
    #[serde(default)]
    pub compaction: CompactionConfig,

    /// Session and workspace paths
    #[serde(default)]
    pub paths: PathsConfig,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            agent: AgentSettings::default(),
            stream: StreamConfig::default(),
            compaction: CompactionConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("agent", &self.agent)
            .field("stream", &self.stream)
            .field("compaction", &self.compaction)
            .field("paths", &self.paths)
            .finish()
    }
}

/// Per-run agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Agent display name
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Step budget
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_agent_name() -> String {
    "stepwright".into()
}
fn default_max_steps() -> u32 {
    10
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            max_steps: default_max_steps(),
        }
    }
}

/// Streaming pacing and deadline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Overall streaming run deadline, in seconds
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Per-step no-progress deadline, in seconds
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Characters per result chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Delay between chunks, in milliseconds
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
}

fn default_run_timeout_secs() -> u64 {
    300
}
fn default_idle_timeout_secs() -> u64 {
    120
}
fn default_chunk_size() -> usize {
    3
}
fn default_chunk_delay_ms() -> u64 {
    20
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            run_timeout_secs: default_run_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            chunk_size: default_chunk_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
        }
    }
}

/// History compaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionConfig {
    #[serde(default = "default_max_retained")]
    pub max_retained_messages: usize,

    #[serde(default = "default_result_truncation")]
    pub tool_result_truncation: usize,

    #[serde(default = "default_argument_truncation")]
    pub tool_argument_truncation: usize,
}

fn default_max_retained() -> usize {
    20
}
fn default_result_truncation() -> usize {
    500
}
fn default_argument_truncation() -> usize {
    200
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            max_retained_messages: default_max_retained(),
            tool_result_truncation: default_result_truncation(),
            tool_argument_truncation: default_argument_truncation(),
        }
    }
}

/// Session and workspace paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for persisted sessions. Defaults to `~/.stepwright/sessions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_dir: Option<PathBuf>,

    /// Workspace directory for tool-generated files. Defaults to
    /// `~/.stepwright/workspace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Default config file path: `~/.stepwright/config.toml`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".stepwright").join("config.toml")
    }

    /// Load from the default path, or fall back to defaults when the file
    /// doesn't exist. Environment overrides are applied either way.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path, applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("STEPWRIGHT_API_KEY") {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("STEPWRIGHT_BASE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("STEPWRIGHT_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(steps) = std::env::var("STEPWRIGHT_MAX_STEPS") {
            if let Ok(parsed) = steps.parse::<u32>() {
                self.agent.max_steps = parsed;
            }
        }
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps < 1 {
            return Err(ConfigError::Invalid(
                "agent.max_steps must be at least 1".into(),
            ));
        }
        if self.stream.chunk_size < 1 {
            return Err(ConfigError::Invalid(
                "stream.chunk_size must be at least 1".into(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        Ok(())
    }

    /// Resolved sessions directory.
    pub fn sessions_dir(&self) -> PathBuf {
        self.paths.sessions_dir.clone().unwrap_or_else(|| {
            Self::default_path()
                .parent()
                .map(|p| p.join("sessions"))
                .unwrap_or_else(|| PathBuf::from("sessions"))
        })
    }

    /// Resolved workspace directory.
    pub fn workspace_dir(&self) -> PathBuf {
        self.paths.workspace_dir.clone().unwrap_or_else(|| {
            Self::default_path()
                .parent()
                .map(|p| p.join("workspace"))
                .unwrap_or_else(|| PathBuf::from("workspace"))
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "Failed to parse config: {msg}"),
            Self::Invalid(msg) => write!(f, "Invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
