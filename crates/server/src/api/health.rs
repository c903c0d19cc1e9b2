use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use inkwell_store::{Document, Repository};
use tracing::warn;

use super::AppState;
use super::schemas::{HealthResponse, StoreHealth};

/// A dependency the health endpoint can ping.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<(), String>;
}

/// Pings a repository.
pub struct RepositoryProbe<T: Document>(pub Arc<dyn Repository<T>>);

#[async_trait]
impl<T: Document> Probe for RepositoryProbe<T> {
    async fn check(&self) -> Result<(), String> {
        self.0.ping().await.map_err(|e| e.to_string())
    }
}

/// `GET /health` -- pings every store.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and the reachability of each store.",
    responses(
        (status = 200, description = "Every store answered", body = HealthResponse),
        (status = 503, description = "At least one store is unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut stores = Vec::with_capacity(state.probes.len());
    for (name, probe) in state.probes.iter() {
        let ok = match probe.check().await {
            Ok(()) => true,
            Err(e) => {
                warn!(store = *name, error = %e, "health check failed");
                false
            }
        };
        stores.push(StoreHealth {
            name: (*name).to_owned(),
            ok,
        });
    }

    let healthy = stores.iter().all(|s| s.ok);
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        stores,
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
