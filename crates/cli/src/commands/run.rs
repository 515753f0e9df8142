//! `stepwright run` — execute a goal through the agent loop.

use std::sync::Arc;
use std::time::Duration;

use stepwright_agent::{AgentRunConfig, AgentRunner, StreamSettings};
use stepwright_config::AppConfig;
use stepwright_core::session::SessionStore;
use stepwright_memory::{CompactionPolicy, FileSessionStore, SessionPersistence};
use stepwright_providers::OpenAiCompatReasoner;
use stepwright_tools::{default_registry, RegistryExecutor};
use tracing::info;

pub async fn run(
    goal: &str,
    session: Option<String>,
    stream: bool,
    financial: bool,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let api_key = config.api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("No API key configured. Set STEPWRIGHT_API_KEY or api_key in config.toml")
    })?;

    let reasoner = Arc::new(OpenAiCompatReasoner::new(
        "openai-compat",
        &config.base_url,
        api_key,
        &config.model,
    ));

    let registry = Arc::new(default_registry(config.workspace_dir()));
    let signatures = registry.signatures();
    let executor = Arc::new(RegistryExecutor::new(registry));

    let run_config = if financial {
        crate::presets::financial(None)
    } else {
        AgentRunConfig::new(&config.agent.name).with_max_steps(config.agent.max_steps)
    };

    let mut runner = AgentRunner::new(run_config, reasoner, executor, signatures)?
        .with_stream_settings(StreamSettings {
            run_timeout: Duration::from_secs(config.stream.run_timeout_secs),
            idle_timeout: Duration::from_secs(config.stream.idle_timeout_secs),
            chunk_size: config.stream.chunk_size,
            chunk_delay: Duration::from_millis(config.stream.chunk_delay_ms),
        });

    if let Some(session_id) = &session {
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::new(config.sessions_dir()));

        let history = store.load(session_id).await?;
        if !history.is_empty() {
            info!(session = %session_id, count = history.len(), "Loaded session history");
            runner = runner.with_history(history);
        }

        let policy = CompactionPolicy {
            max_retained_messages: config.compaction.max_retained_messages,
            tool_result_truncation: config.compaction.tool_result_truncation,
            tool_argument_truncation: config.compaction.tool_argument_truncation,
            ..CompactionPolicy::default()
        };
        runner = runner.with_finalizer(Arc::new(
            SessionPersistence::new(store, session_id.as_str()).with_policy(policy),
        ));
    }

    if stream {
        let mut rx = runner.run_stream(goal.to_string());
        while let Some(event) = rx.recv().await {
            println!("{}", event.wire_frame());
        }
    } else {
        let output = runner.run(goal).await?;
        println!("{output}");
    }

    Ok(())
}
