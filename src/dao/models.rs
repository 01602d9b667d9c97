use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::dao::entity_id;

/// Collections exposed by the upstream REST backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Chess clubs and their members.
    Clubs,
    /// Registered players.
    Players,
    /// Tournament sponsors.
    Sponsors,
    /// Tournament organizers.
    Organizers,
    /// Tournaments with their time window.
    Tournaments,
    /// Scheduled matches between two players.
    Matches,
}

impl EntityKind {
    /// Every collection, in navigation order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Clubs,
        EntityKind::Players,
        EntityKind::Sponsors,
        EntityKind::Organizers,
        EntityKind::Tournaments,
        EntityKind::Matches,
    ];

    /// Path segment of the collection endpoint, both upstream and on the gateway.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Clubs => "clubs",
            EntityKind::Players => "players",
            EntityKind::Sponsors => "sponsors",
            EntityKind::Organizers => "organizers",
            EntityKind::Tournaments => "tournaments",
            EntityKind::Matches => "matches",
        }
    }

    /// Record field shown in association pickers.
    pub fn label_field(self) -> &'static str {
        match self {
            EntityKind::Players => "lastName",
            EntityKind::Matches => "result",
            _ => "name",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Type-level handle on a collection so generic handlers can be instantiated per entity.
pub trait Resource: Send + Sync + 'static {
    /// Collection the marker stands for.
    const KIND: EntityKind;
}

macro_rules! resource {
    ($name:ident, $kind:ident) => {
        #[doc = concat!("Marker for the `", stringify!($kind), "` collection.")]
        pub struct $name;

        impl Resource for $name {
            const KIND: EntityKind = EntityKind::$kind;
        }
    };
}

resource!(ClubResource, Clubs);
resource!(PlayerResource, Players);
resource!(SponsorResource, Sponsors);
resource!(OrganizerResource, Organizers);
resource!(TournamentResource, Tournaments);
resource!(MatchResource, Matches);

/// Closed interval of wall-clock time. `end >= begin` for well-formed ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    /// Start instant.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub begin: OffsetDateTime,
    /// End instant.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub end: OffsetDateTime,
}

impl TimeRange {
    /// Range from `begin` to `end`.
    pub fn new(begin: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { begin, end }
    }
}

/// Minimal `{id, name}` projection used for embedded associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamedRef {
    /// Id of the referenced record.
    #[serde(with = "entity_id")]
    pub id: String,
    /// Display name, empty when the backend omits it.
    #[serde(default)]
    pub name: String,
}

/// Embedded player reference as returned inside clubs, tournaments and matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    /// Id of the player.
    #[serde(with = "entity_id")]
    pub id: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
}

/// A match a player is already committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchSlot {
    /// Id of the committed match.
    #[serde(with = "entity_id")]
    pub id: String,
    /// When the match is played.
    #[serde(flatten)]
    pub range: TimeRange,
}

/// Player record as served by `GET /players/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Player id.
    #[serde(with = "entity_id")]
    pub id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Club the player belongs to.
    #[serde(default)]
    pub club: Option<NamedRef>,
    /// Authoritative list of committed matches, maintained by the backend.
    #[serde(default)]
    pub matches: Vec<MatchSlot>,
}

/// Tournament record; only the fields the gateway reasons about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRecord {
    /// Tournament id.
    #[serde(with = "entity_id")]
    pub id: String,
    /// Tournament name.
    #[serde(default)]
    pub name: String,
    /// Days the tournament runs.
    #[serde(flatten)]
    pub range: TimeRange,
    /// Organizer in charge.
    #[serde(default)]
    pub organizer: Option<NamedRef>,
}

/// Match record as listed by `GET /matches`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchRecord {
    /// Match id.
    #[serde(with = "entity_id")]
    pub id: String,
    /// When the match is played.
    #[serde(flatten)]
    pub range: TimeRange,
    /// Free-text result, such as `1-0`.
    #[serde(default)]
    pub result: String,
    /// The two players.
    #[serde(default)]
    pub players: Vec<PlayerRef>,
    /// Tournament the match belongs to.
    #[serde(default)]
    pub tournament: Option<NamedRef>,
}
