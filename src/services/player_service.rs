use indexmap::IndexMap;
use tracing::warn;

use crate::{
    dao::{
        models::{EntityKind, MatchRecord, PlayerRecord},
        storage::StorageError,
    },
    dto::matches::{PlayerSchedule, TournamentMatches},
    error::ServiceError,
    state::SharedState,
};

/// Group matches by tournament name, keeping the order in which tournaments first
/// appear once matches are sorted by start time.
pub fn group_by_tournament(mut matches: Vec<MatchRecord>) -> Vec<TournamentMatches> {
    matches.sort_by_key(|record| record.range.begin);

    let mut groups: IndexMap<String, Vec<MatchRecord>> = IndexMap::new();
    for record in matches {
        let name = record
            .tournament
            .as_ref()
            .map(|tournament| tournament.name.clone())
            .unwrap_or_default();
        groups.entry(name).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(tournament, matches)| TournamentMatches { tournament, matches })
        .collect()
}

/// Every match `player_id` plays, grouped by tournament.
pub async fn schedule(state: &SharedState, player_id: String) -> Result<PlayerSchedule, ServiceError> {
    let store = state.require_store().await?;
    let record = store
        .find(EntityKind::Players, player_id.clone())
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Players, &player_id))?;
    let player: PlayerRecord = serde_json::from_value(record)
        .map_err(|err| StorageError::malformed(format!("player `{player_id}`: {err}")))?;

    let mut matches = Vec::new();
    for raw in store.list_all(EntityKind::Matches).await? {
        match serde_json::from_value::<MatchRecord>(raw) {
            Ok(record) if record.players.iter().any(|p| p.id == player.id) => matches.push(record),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "skipping undecodable match record"),
        }
    }

    Ok(PlayerSchedule {
        player_id: player.id,
        first_name: player.first_name,
        last_name: player.last_name,
        tournaments: group_by_tournament(matches),
    })
}
