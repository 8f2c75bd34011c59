//! Bloodlink server entry point
//!
//! Boot order: config -> logging -> store -> gateway. The store handle is
//! created once here and shared through [`AppState`].
//!
//! [`AppState`]: bloodlink::gateway::state::AppState

use std::sync::Arc;

use bloodlink::config::AppConfig;
use bloodlink::db::Database;
use bloodlink::gateway::{self, state::AppState};
use bloodlink::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);

    let _guard = init_logging(&config);
    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        "Starting bloodlink"
    );

    let db = Arc::new(Database::connect(&config.postgres_url).await?);
    db.health_check().await?;

    let state = Arc::new(AppState::new(db, &config));

    gateway::run_server(state, &config.gateway.host, config.gateway.port).await
}
