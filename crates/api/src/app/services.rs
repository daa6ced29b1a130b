//! Service wiring: repositories, event bus and the marketplace use cases.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use antiwaste_events::{EventBus, EventEnvelope, InMemoryEventBus};
use antiwaste_infra::{AppConfig, Marketplace, Repositories, RepositoryError, ensure_schema};

pub type AppBus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

/// Shared state behind every protected route.
pub struct AppServices {
    pub market: Marketplace<AppBus>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("schema setup failed: {0}")]
    Schema(#[from] RepositoryError),

    #[error("failed to start event audit log: {0}")]
    AuditLog(#[from] std::io::Error),
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let repos = match config.database_url.as_deref() {
        Some(url) if config.use_persistent_stores => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            ensure_schema(&pool).await?;
            tracing::info!("using postgres document stores");
            Repositories::postgres(pool)
        }
        _ => {
            tracing::info!("using in-memory stores");
            Repositories::in_memory()
        }
    };

    let bus: AppBus = Arc::new(InMemoryEventBus::new());
    // The audit thread exits once the bus (and with it every sender) is dropped.
    antiwaste_observability::spawn_audit_log(bus.subscribe())?;

    Ok(AppServices {
        market: Marketplace::new(repos, bus, config.lifecycle),
    })
}
