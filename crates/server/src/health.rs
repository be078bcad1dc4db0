use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use gamescout_core::CatalogBackend;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<dyn CatalogBackend>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(catalog: Arc<dyn CatalogBackend>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    catalog: Arc<dyn CatalogBackend>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(catalog)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(state.catalog.as_ref()).await;
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "gamescout-server runtime initialized".to_string(),
        },
        catalog,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn catalog_check(catalog: &dyn CatalogBackend) -> HealthCheck {
    match catalog.health_check().await {
        Ok(()) => HealthCheck {
            status: "ready",
            detail: format!("{} catalog backend reachable", catalog.name()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("catalog check failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{extract::State, http::StatusCode, Json};
    use gamescout_catalog::demo_backend;
    use gamescout_core::{CatalogBackend, CatalogError, CatalogItem};

    use crate::health::{health, HealthState};

    struct DownCatalog;

    #[async_trait]
    impl CatalogBackend for DownCatalog {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn search(&self, _: &str, _: usize) -> Result<Vec<CatalogItem>, CatalogError> {
            Err(CatalogError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn health_returns_ready_when_catalog_is_reachable() {
        let (status, Json(payload)) =
            health(State(HealthState { catalog: Arc::new(demo_backend()) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_catalog_is_down() {
        let (status, Json(payload)) =
            health(State(HealthState { catalog: Arc::new(DownCatalog) })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert!(payload.catalog.detail.contains("connection refused"));
        assert_eq!(payload.service.status, "ready");
    }
}
