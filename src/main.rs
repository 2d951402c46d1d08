//! userd - greeting counter and user registry HTTP service.
//!
//! The heavy lifting lives in the library crate; this file is a thin
//! orchestrator that wires config, database, events, and the HTTP server.

use userd::config::Config;
use userd::db::Database;
use userd::events::UserEvents;
use userd::{events, http, metrics};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(server = %config.server.name, "Starting userd");

    // Metrics registry must exist before the first request is recorded
    metrics::init();

    // Initialize database
    let db_path = config
        .database
        .as_ref()
        .map(|d| d.path.as_str())
        .unwrap_or("userd.db");
    let db = Database::new(db_path).await?;

    // User lifecycle events, consumed by the logging subscriber
    let user_events = UserEvents::new();
    let _event_logger = events::spawn_event_logger(&user_events);

    http::serve(config.listen.address, db, user_events).await
}
