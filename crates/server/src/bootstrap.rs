use std::sync::Arc;

use rentdesk_agent::{ChatService, LlmError};
use rentdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use rentdesk_db::{connect_with_settings, migrations, DbPool, SqlCatalogRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub chat: Arc<ChatService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("llm client setup failed: {0}")]
    Llm(#[from] LlmError),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = Arc::new(SqlCatalogRepository::new(db_pool.clone()));
    let chat = Arc::new(ChatService::from_config(&config, catalog)?);
    info!(
        event_name = "system.bootstrap.assistant_ready",
        correlation_id = "bootstrap",
        llm_provider = ?config.llm.provider,
        llm_model = %config.llm.model,
        entity_matching = ?config.assistant.entity_matching,
        "assistant collaborators constructed"
    );

    Ok(Application { config, db_pool, chat })
}

#[cfg(test)]
mod tests {
    use rentdesk_core::config::{ConfigOverrides, LlmProvider, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str) -> ConfigOverrides {
        ConfigOverrides {
            database_url: Some(database_url.to_string()),
            llm_provider: Some(LlmProvider::Ollama),
            ..ConfigOverrides::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_api_key_for_hosted_provider() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::Groq),
                ..overrides("sqlite::memory:")
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("llm.api_key"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn bootstrap_migrates_catalog_schema() {
        let app = bootstrap(LoadOptions {
            overrides: overrides("sqlite::memory:"),
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('shop', 'car', 'car_availability')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("catalog tables should exist after bootstrap");
        assert_eq!(table_count, 3);

        app.db_pool.close().await;
    }
}
