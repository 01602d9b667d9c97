use serde::de::DeserializeOwned;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::{
    dao::{
        collection_store::CollectionStore,
        models::{EntityKind, PlayerRecord, TimeRange, TournamentRecord},
        storage::StorageError,
    },
    dto::{
        matches::{IdRef, MatchBody, MatchInput},
        validation::ValidationReport,
    },
    error::ServiceError,
    state::{
        SharedState,
        schedule::{MatchDraft, PlayerCommitments, PlayerSlot, TournamentWindow, validate_match},
    },
};

fn decode<T: DeserializeOwned>(kind: EntityKind, record: Value) -> Result<T, ServiceError> {
    serde_json::from_value(record).map_err(|err| {
        ServiceError::from(StorageError::malformed(format!("{kind} record: {err}")))
    })
}

/// Read a referenced record. Unknown ids count as "nothing selected".
async fn referenced<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    kind: EntityKind,
    id: Option<&str>,
) -> Result<Option<T>, ServiceError> {
    let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    match store.find(kind, id.to_string()).await? {
        Some(record) => decode(kind, record).map(Some),
        None => {
            debug!(%kind, id, "referenced record not found");
            Ok(None)
        }
    }
}

/// Build the draft a submission describes, reading the tournament window and each
/// player's committed matches from the store.
async fn draft(
    store: &dyn CollectionStore,
    input: &MatchInput,
    now: OffsetDateTime,
) -> Result<MatchDraft, ServiceError> {
    let mut draft = MatchDraft::starting_at(now).with_result(input.result.clone());
    if let Some(id) = input.id.as_deref().filter(|id| !id.is_empty()) {
        draft = draft.with_id(id);
    }

    let tournament =
        referenced::<TournamentRecord>(store, EntityKind::Tournaments, input.tournament_id.as_deref())
            .await?;
    if let Some(tournament) = tournament {
        draft = draft.with_tournament(TournamentWindow {
            id: tournament.id,
            range: tournament.range,
        });
    }

    let begin = input.begin.unwrap_or(draft.range.begin);
    let end = match (input.end, &draft.tournament) {
        (Some(end), _) => end,
        (None, Some(_)) => draft.range.end,
        (None, None) => begin + Duration::days(1),
    };
    draft = draft.with_range(TimeRange::new(begin, end));

    for (slot, id) in [
        (PlayerSlot::First, input.player1_id.as_deref()),
        (PlayerSlot::Second, input.player2_id.as_deref()),
    ] {
        if let Some(player) = referenced::<PlayerRecord>(store, EntityKind::Players, id).await? {
            draft = draft.with_player(
                slot,
                PlayerCommitments {
                    id: player.id,
                    matches: player.matches,
                },
            );
        }
    }

    Ok(draft)
}

/// Payload for the backend; `None` when the draft is incomplete.
fn body(draft: &MatchDraft) -> Option<MatchBody> {
    let tournament = draft.tournament.as_ref()?;
    let first = draft.player1.as_ref()?;
    let second = draft.player2.as_ref()?;
    Some(MatchBody {
        range: draft.range,
        result: draft.result.trim().to_string(),
        tournament: IdRef {
            id: tournament.id.clone(),
        },
        players: [IdRef { id: first.id.clone() }, IdRef { id: second.id.clone() }],
    })
}

/// Run the match rules without writing anything.
pub async fn validate(state: &SharedState, input: MatchInput) -> Result<ValidationReport, ServiceError> {
    let store = state.require_store().await?;
    let draft = draft(store.as_ref(), &input, OffsetDateTime::now_utc()).await?;
    Ok(ValidationReport::from(&validate_match(&draft)))
}

async fn checked_body(
    store: &dyn CollectionStore,
    input: &MatchInput,
) -> Result<Value, ServiceError> {
    let draft = draft(store, input, OffsetDateTime::now_utc()).await?;
    let violations = validate_match(&draft);
    if !violations.is_empty() {
        return Err(ServiceError::Invalid(ValidationReport::from(&violations)));
    }
    let body = body(&draft)
        .ok_or_else(|| ServiceError::InvalidInput("incomplete match".into()))?;
    serde_json::to_value(body).map_err(|err| ServiceError::InvalidInput(err.to_string()))
}

/// Validate a match against the stored schedules and create it.
pub async fn create(state: &SharedState, mut input: MatchInput) -> Result<Value, ServiceError> {
    let store = state.require_store().await?;
    input.id = None;
    let body = checked_body(store.as_ref(), &input).await?;

    let created = store.create(EntityKind::Matches, body).await?;
    info!(id = ?created.get("id"), "match scheduled");
    Ok(created)
}

/// Reschedule an existing match; its own slot never conflicts with itself.
pub async fn update(
    state: &SharedState,
    id: String,
    mut input: MatchInput,
) -> Result<Value, ServiceError> {
    let store = state.require_store().await?;
    if store.find(EntityKind::Matches, id.clone()).await?.is_none() {
        return Err(ServiceError::not_found(EntityKind::Matches, &id));
    }
    input.id = Some(id.clone());
    let body = checked_body(store.as_ref(), &input).await?;

    let updated = store
        .update(EntityKind::Matches, id.clone(), body)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Matches, &id))?;
    info!(id = %id, "match rescheduled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::{config::AppConfig, dao::collection_store::memory::MemoryStore, state::AppState};

    /// Tournament 1 spans May 2024; players 2 and 3, neither booked yet.
    async fn fixture() -> SharedState {
        let store = MemoryStore::new();
        store
            .insert(
                EntityKind::Tournaments,
                json!({
                    "id": "1",
                    "name": "Riga Open",
                    "begin": "2024-05-01T00:00:00Z",
                    "end": "2024-05-31T23:00:00Z"
                }),
            )
            .await
            .unwrap();
        for (id, last_name) in [("2", "Tal"), ("3", "Petrosian")] {
            store
                .insert(EntityKind::Players, json!({"id": id, "lastName": last_name, "matches": []}))
                .await
                .unwrap();
        }
        AppState::with_store(AppConfig::default(), Arc::new(store)).await
    }

    fn game(begin: OffsetDateTime, end: OffsetDateTime) -> MatchInput {
        MatchInput {
            begin: Some(begin),
            end: Some(end),
            result: "1-0".into(),
            tournament_id: Some("1".into()),
            player1_id: Some("2".into()),
            player2_id: Some("3".into()),
            ..MatchInput::default()
        }
    }

    #[tokio::test]
    async fn empty_form_reports_every_missing_selection() {
        let state = fixture().await;
        let report = validate(&state, MatchInput::default()).await.unwrap();
        assert_eq!(report.fields, ["result", "tournament", "player1", "player2"]);
    }

    #[tokio::test]
    async fn window_defaults_to_the_tournament() {
        let state = fixture().await;
        let store = state.require_store().await.unwrap();
        let input = MatchInput {
            tournament_id: Some("1".into()),
            ..MatchInput::default()
        };
        let draft = draft(store.as_ref(), &input, datetime!(2024-01-01 00:00 UTC))
            .await
            .unwrap();
        assert_eq!(draft.range.begin, datetime!(2024-05-01 00:00 UTC));
        assert_eq!(draft.range.end, datetime!(2024-05-31 23:00 UTC));
    }

    #[tokio::test]
    async fn window_without_tournament_lasts_one_day() {
        let state = fixture().await;
        let store = state.require_store().await.unwrap();
        let input = MatchInput {
            begin: Some(datetime!(2024-06-10 15:00 UTC)),
            ..MatchInput::default()
        };
        let draft = draft(store.as_ref(), &input, datetime!(2024-01-01 00:00 UTC))
            .await
            .unwrap();
        assert_eq!(draft.range.end, datetime!(2024-06-11 15:00 UTC));
    }

    #[tokio::test]
    async fn second_booking_at_the_same_start_is_refused() {
        let state = fixture().await;
        let first = game(datetime!(2024-05-02 10:00 UTC), datetime!(2024-05-02 11:00 UTC));
        create(&state, first.clone()).await.unwrap();

        let err = create(&state, first).await.unwrap_err();
        let ServiceError::Invalid(report) = err else {
            panic!("expected a validation failure, got {err:?}");
        };
        assert_eq!(report.fields, ["begin", "end"]);
        assert_eq!(report.messages.len(), 2);
    }

    #[tokio::test]
    async fn booking_that_starts_during_another_match_is_accepted() {
        let state = fixture().await;
        create(&state, game(datetime!(2024-05-02 10:00 UTC), datetime!(2024-05-02 11:00 UTC)))
            .await
            .unwrap();

        let report = validate(
            &state,
            game(datetime!(2024-05-02 10:30 UTC), datetime!(2024-05-02 11:30 UTC)),
        )
        .await
        .unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn rescheduling_ignores_the_match_itself() {
        let state = fixture().await;
        let created = create(
            &state,
            game(datetime!(2024-05-02 10:00 UTC), datetime!(2024-05-02 11:00 UTC)),
        )
        .await
        .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = update(
            &state,
            id,
            game(datetime!(2024-05-02 09:00 UTC), datetime!(2024-05-02 10:30 UTC)),
        )
        .await
        .unwrap();
        assert_eq!(updated["begin"], json!("2024-05-02T09:00:00Z"));
        assert_eq!(updated["players"], json!([{"id": "2"}, {"id": "3"}]));
    }

    #[tokio::test]
    async fn match_outside_tournament_is_refused() {
        let state = fixture().await;
        let report = validate(
            &state,
            game(datetime!(2024-06-02 10:00 UTC), datetime!(2024-06-02 11:00 UTC)),
        )
        .await
        .unwrap();
        assert_eq!(report.fields, ["end"]);
    }
}
