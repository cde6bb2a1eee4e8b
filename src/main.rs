//! Visitor Desk - overdue visitor monitor
//!
//! Loads the visitor store and keeps the alert report current until Ctrl-C.

use chrono::Utc;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use visitor_desk::{
    config::AppConfig,
    repository::{MemoryPresenceStore, MemoryVisitorStore, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("visitor_desk={}", config.logging.level).into());

    let (file_layer, _file_guard) = match &config.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "visitor-desk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };
    let json = config.logging.format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(fmt::layer))
        .with(json.then(|| fmt::layer().json()))
        .with(file_layer)
        .init();

    tracing::info!("Starting Visitor Desk v{}", env!("CARGO_PKG_VERSION"));

    // Create the visitor store
    let visitors = match &config.store.seed_path {
        Some(path) => MemoryVisitorStore::load_seed_file(path, Utc::now()).await?,
        None => {
            tracing::info!("No seed file configured, starting with an empty store");
            MemoryVisitorStore::default()
        }
    };
    let repository = Repository::new(Arc::new(visitors), Arc::new(MemoryPresenceStore::default()));

    // Create application state
    let state = AppState::new(config, repository);

    let heartbeat = state
        .config
        .presence
        .user_id
        .as_ref()
        .map(|user| state.services.presence.start_heartbeat(user.clone()));

    let monitor = state.alert_monitor();
    monitor
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown requested"),
                Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
            }
        })
        .await?;

    if let Some(heartbeat) = heartbeat {
        heartbeat.stop().await?;
    }

    Ok(())
}
