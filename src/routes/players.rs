use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{matches::PlayerSchedule, player::PlayerInput},
    error::{AppError, ErrorBody},
    routes::entities,
    services::player_service,
    state::SharedState,
};

/// Matches of a player, grouped by tournament.
#[utoipa::path(
    get,
    path = "/api/players/{id}/schedule",
    tag = "players",
    params(("id" = String, Path, description = "Player identifier")),
    responses(
        (status = 200, description = "Matches grouped by tournament", body = PlayerSchedule),
        (status = 404, description = "Unknown player", body = ErrorBody)
    )
)]
pub async fn schedule(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerSchedule>, AppError> {
    Ok(Json(player_service::schedule(&state, id).await?))
}

/// Player routes: the shared collection routes plus the schedule.
pub fn router() -> Router<SharedState> {
    entities::router::<PlayerInput>().route("/api/players/{id}/schedule", get(schedule))
}
