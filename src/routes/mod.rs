use axum::Router;

use crate::{
    dto::{
        club::ClubInput, organizer::OrganizerInput, sponsor::SponsorInput,
        tournament::TournamentInput,
    },
    state::SharedState,
};

/// Swagger UI.
pub mod docs;
/// Routes shared by every collection.
pub mod entities;
/// Health check.
pub mod health;
/// Match writes and pre-validation.
pub mod matches;
/// Player schedule.
pub mod players;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(entities::router::<ClubInput>())
        .merge(players::router())
        .merge(entities::router::<SponsorInput>())
        .merge(entities::router::<OrganizerInput>())
        .merge(entities::router::<TournamentInput>())
        .merge(matches::router());

    api_router.merge(docs::router()).with_state(state)
}
