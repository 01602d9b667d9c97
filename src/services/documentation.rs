use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the chess administration gateway.
///
/// The per-collection list/get/delete/suggestion routes are generic over the entity
/// and described by the shared page and input schemas below.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::validate,
        crate::routes::matches::create,
        crate::routes::matches::update,
        crate::routes::players::schedule,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::validation::ValidationReport,
            crate::dto::page::PageResponse,
            crate::dto::page::DeleteResponse,
            crate::state::pagination::PageLinks,
            crate::dto::club::ClubInput,
            crate::dto::player::PlayerInput,
            crate::dto::sponsor::SponsorInput,
            crate::dto::organizer::OrganizerInput,
            crate::dto::tournament::TournamentInput,
            crate::dto::matches::MatchInput,
            crate::dto::matches::PlayerSchedule,
            crate::dto::matches::TournamentMatches,
            crate::dao::models::EntityKind,
            crate::dao::models::MatchRecord,
            crate::dao::models::MatchSlot,
            crate::dao::models::NamedRef,
            crate::dao::models::PlayerRef,
            crate::dao::models::TimeRange,
            crate::state::schedule::MatchField,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matches", description = "Match scheduling and conflict checks"),
        (name = "players", description = "Player calendars"),
    )
)]
/// OpenAPI document of the gateway.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_match_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/matches/validate"));
        assert!(doc.paths.paths.contains_key("/api/players/{id}/schedule"));
    }
}
