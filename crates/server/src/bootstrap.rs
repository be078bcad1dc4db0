use std::sync::Arc;

use gamescout_agent::{AgentRuntime, HttpLlmClient, LlmError};
use gamescout_catalog::backend_from_config;
use gamescout_core::config::{AppConfig, ConfigError, LoadOptions};
use gamescout_core::{CatalogBackend, CatalogError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<dyn CatalogBackend>,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("catalog backend setup failed: {0}")]
    Catalog(#[source] CatalogError),
    #[error("generation backend setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let catalog = backend_from_config(&config.catalog).map_err(BootstrapError::Catalog)?;
    info!(
        event_name = "system.bootstrap.catalog_ready",
        correlation_id = "bootstrap",
        backend = catalog.name(),
        "catalog backend configured"
    );

    let llm = HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
    info!(
        event_name = "system.bootstrap.llm_ready",
        correlation_id = "bootstrap",
        endpoint = %llm.endpoint(),
        model = %config.llm.model,
        "generation backend configured"
    );

    let runtime = AgentRuntime::from_config(&config, Arc::new(llm), catalog.clone());

    Ok(Application { config, catalog, runtime: Arc::new(runtime) })
}

#[cfg(test)]
mod tests {
    use gamescout_core::config::{ConfigOverrides, LlmProvider, LoadOptions};

    use crate::bootstrap::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_without_openai_key() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::OpenAi),
                catalog_use_fixtures: Some(true),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_wires_fixture_catalog() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                catalog_use_fixtures: Some(true),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with fixtures");

        assert_eq!(app.catalog.name(), "memory");
        assert!(app.catalog.health_check().await.is_ok());
        assert_eq!(app.runtime.tools().catalog().backend().name(), "memory");
    }
}
