//! Scheduling rules for matches: the double-booking check run against each player's
//! committed matches, bundled with the field-level checks of the match form.
//!
//! Everything here is pure. [`validate_match`] never fails; it returns the violations
//! found, and callers decide how to word them.

use std::collections::BTreeSet;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use utoipa::ToSchema;

use crate::dao::models::{MatchSlot, TimeRange};

/// Form inputs a violation can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    /// Start time.
    Begin,
    /// End time.
    End,
    /// Result text.
    Result,
    /// Tournament picker.
    Tournament,
    /// First player picker.
    Player1,
    /// Second player picker.
    Player2,
}

impl MatchField {
    /// Tag sent to the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Begin => "begin",
            MatchField::End => "end",
            MatchField::Result => "result",
            MatchField::Tournament => "tournament",
            MatchField::Player1 => "player1",
            MatchField::Player2 => "player2",
        }
    }
}

/// Which side of the match a player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    /// Player 1.
    First,
    /// Player 2.
    Second,
}

impl PlayerSlot {
    /// Input holding this slot.
    pub fn field(self) -> MatchField {
        match self {
            PlayerSlot::First => MatchField::Player1,
            PlayerSlot::Second => MatchField::Player2,
        }
    }
}

/// A selected player together with the matches the backend says they already play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommitments {
    /// Player id.
    pub id: String,
    /// Matches the player is committed to.
    pub matches: Vec<MatchSlot>,
}

/// Time window of the tournament a match belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentWindow {
    /// Tournament id.
    pub id: String,
    /// Days the tournament runs.
    pub range: TimeRange,
}

/// Candidate match as edited in a form. Edits produce a new value rather than
/// mutating the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDraft {
    /// `None` (or empty) for a match that does not exist yet.
    pub id: Option<String>,
    /// When the match would be played.
    pub range: TimeRange,
    /// Result text.
    pub result: String,
    /// Selected tournament.
    pub tournament: Option<TournamentWindow>,
    /// Selected first player.
    pub player1: Option<PlayerCommitments>,
    /// Selected second player.
    pub player2: Option<PlayerCommitments>,
}

impl MatchDraft {
    /// Empty draft over `range`.
    pub fn new(range: TimeRange) -> Self {
        Self {
            id: None,
            range,
            result: String::new(),
            tournament: None,
            player1: None,
            player2: None,
        }
    }

    /// Blank draft spanning one day from `now`, the default of a fresh create form.
    pub fn starting_at(now: OffsetDateTime) -> Self {
        Self::new(TimeRange::new(now, now + Duration::days(1)))
    }

    /// Draft editing the existing match `id`.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self
        }
    }

    /// Draft with another result.
    pub fn with_result(self, result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            ..self
        }
    }

    /// Draft with another time window.
    pub fn with_range(self, range: TimeRange) -> Self {
        Self { range, ..self }
    }

    /// Select a tournament; the match window snaps to the tournament's own window.
    pub fn with_tournament(self, tournament: TournamentWindow) -> Self {
        Self {
            range: tournament.range,
            tournament: Some(tournament),
            ..self
        }
    }

    /// Draft with `player` in `slot`.
    pub fn with_player(self, slot: PlayerSlot, player: PlayerCommitments) -> Self {
        match slot {
            PlayerSlot::First => Self {
                player1: Some(player),
                ..self
            },
            PlayerSlot::Second => Self {
                player2: Some(player),
                ..self
            },
        }
    }
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The result is empty.
    BlankResult,
    /// `end` precedes `begin`.
    EndsBeforeBegin,
    /// No tournament selected.
    MissingTournament,
    /// A player slot is empty.
    MissingPlayer(PlayerSlot),
    /// Both slots hold the same player.
    SamePlayer,
    /// The match starts before the tournament.
    BeginsBeforeTournament,
    /// The match ends after the tournament.
    EndsAfterTournament,
    /// The player in `slot` already plays match `match_id` at a conflicting time.
    DoubleBooked {
        /// Side of the booked player.
        slot: PlayerSlot,
        /// The match already booked.
        match_id: String,
    },
}

impl Violation {
    /// Inputs to flag as invalid for this violation.
    pub fn fields(&self) -> &'static [MatchField] {
        match self {
            Violation::BlankResult => &[MatchField::Result],
            Violation::EndsBeforeBegin => &[MatchField::Begin, MatchField::End],
            Violation::MissingTournament => &[MatchField::Tournament],
            Violation::MissingPlayer(PlayerSlot::First) => &[MatchField::Player1],
            Violation::MissingPlayer(PlayerSlot::Second) => &[MatchField::Player2],
            Violation::SamePlayer => &[MatchField::Player2],
            Violation::BeginsBeforeTournament => &[MatchField::Begin],
            Violation::EndsAfterTournament => &[MatchField::End],
            Violation::DoubleBooked { .. } => &[MatchField::Begin, MatchField::End],
        }
    }
}

/// Outcome of [`validate_match`]. Submission is allowed only when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchViolations {
    violations: Vec<Violation>,
}

impl MatchViolations {
    /// Whether the draft can be submitted.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in detection order.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Distinct violated-field tags.
    pub fn fields(&self) -> BTreeSet<MatchField> {
        self.violations
            .iter()
            .flat_map(|violation| violation.fields().iter().copied())
            .collect()
    }
}

/// Whether `candidate` can be scheduled next to `existing`.
///
/// Both sides are compared against `existing.begin` only; `existing.end` is never
/// consulted. A candidate starting after the other match started is accepted even
/// if that match is still running.
pub fn is_free(candidate: &TimeRange, existing: &TimeRange) -> bool {
    (candidate.begin < existing.begin && candidate.end < existing.begin)
        || (candidate.begin > existing.begin && candidate.end > existing.begin)
}

/// Committed matches of `player` that collide with `range`, skipping the match being
/// edited (`candidate_id`).
pub fn player_conflicts<'a>(
    candidate_id: Option<&'a str>,
    range: &'a TimeRange,
    player: &'a PlayerCommitments,
) -> impl Iterator<Item = &'a MatchSlot> + 'a {
    let own_id = candidate_id.filter(|id| !id.is_empty());
    player
        .matches
        .iter()
        .filter(move |slot| Some(slot.id.as_str()) != own_id)
        .filter(move |slot| !is_free(range, &slot.range))
}

/// Run every match form rule against `draft`.
pub fn validate_match(draft: &MatchDraft) -> MatchViolations {
    let mut violations = Vec::new();
    let range = &draft.range;

    if draft.result.trim().is_empty() {
        violations.push(Violation::BlankResult);
    }

    if range.end < range.begin {
        violations.push(Violation::EndsBeforeBegin);
    }

    match &draft.tournament {
        Some(tournament) => {
            if range.begin < tournament.range.begin {
                violations.push(Violation::BeginsBeforeTournament);
            }
            if range.end > tournament.range.end {
                violations.push(Violation::EndsAfterTournament);
            }
        }
        None => violations.push(Violation::MissingTournament),
    }

    if draft.player1.is_none() {
        violations.push(Violation::MissingPlayer(PlayerSlot::First));
    }
    if draft.player2.is_none() {
        violations.push(Violation::MissingPlayer(PlayerSlot::Second));
    }
    if let (Some(first), Some(second)) = (&draft.player1, &draft.player2) {
        if first.id == second.id {
            violations.push(Violation::SamePlayer);
        }
    }

    let candidate_id = draft.id.as_deref();
    for (slot, player) in [
        (PlayerSlot::First, &draft.player1),
        (PlayerSlot::Second, &draft.player2),
    ] {
        let Some(player) = player else {
            continue;
        };
        violations.extend(
            player_conflicts(candidate_id, range, player).map(|conflict| {
                Violation::DoubleBooked {
                    slot,
                    match_id: conflict.id.clone(),
                }
            }),
        );
    }

    MatchViolations { violations }
}
