mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod state;
mod students;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "studentdb=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr = config.listen_addr();
    tracing::info!(
        max_login_attempts = ?config.max_login_attempts,
        db_max_connections = config.db.max_connections,
        "configuration loaded"
    );

    let state = AppState::init(config).await?;
    app::serve(app::build_app(state), &addr).await
}
