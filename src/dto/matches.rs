use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::dao::{
    entity_id,
    models::{MatchRecord, TimeRange},
};

/// Match create/edit form, as submitted or as re-validated on every field change.
///
/// Only ids are taken for the tournament and the players: their time windows and
/// committed matches are read from the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchInput {
    /// Match being edited. Ignored on create and update, where the path decides.
    #[serde(with = "entity_id::option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub id: Option<String>,
    /// Defaults to the tournament's begin, or to now without a tournament.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub begin: Option<OffsetDateTime>,
    /// Defaults to the tournament's end, or to one day after `begin`.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end: Option<OffsetDateTime>,
    /// Free-text result; must not be blank.
    pub result: String,
    /// Selected tournament.
    #[serde(with = "entity_id::option")]
    #[schema(value_type = Option<String>)]
    pub tournament_id: Option<String>,
    /// First player.
    #[serde(with = "entity_id::option")]
    #[schema(value_type = Option<String>)]
    pub player1_id: Option<String>,
    /// Second player; must differ from the first.
    #[serde(with = "entity_id::option")]
    #[schema(value_type = Option<String>)]
    pub player2_id: Option<String>,
}

/// Reference to a record by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRef {
    /// Id of the referenced record.
    pub id: String,
}

/// Payload the backend expects for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchBody {
    /// When the match is played.
    #[serde(flatten)]
    pub range: TimeRange,
    /// Trimmed result.
    pub result: String,
    /// Tournament the match belongs to.
    pub tournament: IdRef,
    /// First and second player.
    pub players: [IdRef; 2],
}

/// Matches of one tournament on a player's schedule.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TournamentMatches {
    /// Tournament name, empty for matches outside any tournament.
    pub tournament: String,
    /// Matches sorted by start.
    pub matches: Vec<MatchRecord>,
}

/// Body of `GET /api/players/{id}/schedule`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSchedule {
    /// Player whose schedule this is.
    pub player_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Groups in the order their first match appears.
    pub tournaments: Vec<TournamentMatches>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn reads_partial_form_with_numeric_ids() {
        let input: MatchInput = serde_json::from_value(json!({
            "result": "1/2-1/2",
            "tournamentId": 7,
            "player1Id": "a",
            "begin": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(input.tournament_id.as_deref(), Some("7"));
        assert_eq!(input.player1_id.as_deref(), Some("a"));
        assert!(input.player2_id.is_none());
        assert_eq!(input.begin, Some(datetime!(2024-05-01 10:00 UTC)));
        assert!(input.end.is_none());
        assert!(input.id.is_none());
    }

    #[test]
    fn body_nests_references() {
        let body = MatchBody {
            range: TimeRange::new(
                datetime!(2024-05-01 10:00 UTC),
                datetime!(2024-05-01 11:00 UTC),
            ),
            result: "1-0".into(),
            tournament: IdRef { id: "7".into() },
            players: [IdRef { id: "a".into() }, IdRef { id: "b".into() }],
        };

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "begin": "2024-05-01T10:00:00Z",
                "end": "2024-05-01T11:00:00Z",
                "result": "1-0",
                "tournament": {"id": "7"},
                "players": [{"id": "a"}, {"id": "b"}]
            })
        );
    }
}
