use anyhow::Context;
use server::{config::ServerConfig, db::PassageSource, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    info!(
        "min_players = {}, static_dir = {}",
        config.min_players, config.static_dir
    );

    let passages = PassageSource::from_url(config.database_url.as_deref()).await;
    let state = AppState::new(passages, config.min_players);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;

    server::serve(listener, state, &config.static_dir).await
}
