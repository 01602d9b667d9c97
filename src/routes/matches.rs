use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
};
use serde_json::Value;

use crate::{
    dao::models::MatchResource,
    dto::{matches::MatchInput, validation::ValidationReport},
    error::{AppError, ErrorBody},
    routes::entities::resource_router,
    services::match_service,
    state::SharedState,
};

/// Check a match form without saving it.
#[utoipa::path(
    post,
    path = "/api/matches/validate",
    tag = "matches",
    request_body = MatchInput,
    responses(
        (status = 200, description = "Violated fields and messages; empty when the match can be scheduled", body = ValidationReport),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Check a match form without saving it.
pub async fn validate(
    State(state): State<SharedState>,
    Json(input): Json<MatchInput>,
) -> Result<Json<ValidationReport>, AppError> {
    Ok(Json(match_service::validate(&state, input).await?))
}

/// Create a match once it passes every check.
#[utoipa::path(
    post,
    path = "/api/matches",
    tag = "matches",
    request_body = MatchInput,
    responses(
        (status = 201, description = "Match scheduled", body = serde_json::Value),
        (status = 422, description = "Match rules violated", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
/// Schedule a new match after checking both players' calendars.
pub async fn create(
    State(state): State<SharedState>,
    Json(input): Json<MatchInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = match_service::create(&state, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit a match, ignoring its own slot in the overlap check.
#[utoipa::path(
    patch,
    path = "/api/matches/{id}",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    request_body = MatchInput,
    responses(
        (status = 200, description = "Match rescheduled", body = serde_json::Value),
        (status = 404, description = "Unknown match", body = ErrorBody),
        (status = 422, description = "Match rules violated", body = ErrorBody)
    )
)]
/// Reschedule an existing match.
pub async fn update(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MatchInput>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(match_service::update(&state, id, input).await?))
}

/// Match collection routes; writes go through the scheduling rules.
pub fn router() -> Router<SharedState> {
    resource_router::<MatchResource>(post(create), patch(update))
        .route("/api/matches/validate", post(validate))
}
