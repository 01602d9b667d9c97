use serde::Serialize;
use utoipa::ToSchema;

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Requests are served.
    Ok,
    /// The backing store is unreachable; entity routes answer 503.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Whether the store currently answers.
    pub status: HealthStatus,
    /// Which store serves the collections: `rest`, `memory`, or `none` before one is attached.
    pub store: String,
}

impl HealthResponse {
    /// Response for the given degraded flag and backend name.
    pub fn new(degraded: bool, store: &str) -> Self {
        let status = if degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };
        Self {
            status,
            store: store.to_string(),
        }
    }
}
