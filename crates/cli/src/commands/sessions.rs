//! `stepwright sessions` — list persisted sessions.

use stepwright_config::AppConfig;
use stepwright_memory::FileSessionStore;

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let store = FileSessionStore::new(config.sessions_dir());

    let sessions = store.list_sessions();
    if sessions.is_empty() {
        println!("No persisted sessions.");
        return Ok(());
    }

    println!("Persisted sessions:");
    for id in sessions {
        println!("  {id}");
    }
    Ok(())
}
