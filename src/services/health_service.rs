use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the store once and report the degraded flag maintained by the supervisor.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.store().await else {
        warn!("no store installed (degraded mode)");
        return HealthResponse::new(true, "none");
    };

    if let Err(err) = store.health_check().await {
        warn!(backend = store.backend_name(), error = %err, "store health check failed");
    }

    HealthResponse::new(state.is_degraded(), store.backend_name())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::collection_store::memory::MemoryStore, dto::health::HealthStatus,
        state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        let response = health_status(&state).await;
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.store, "none");

        state.install_store(Arc::new(MemoryStore::new())).await;
        let response = health_status(&state).await;
        assert_eq!(response.status, HealthStatus::Ok);
        assert_eq!(response.store, "memory");
    }
}
