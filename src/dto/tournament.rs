use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{NamedRef, PlayerRef, TournamentResource},
    dto::{
        EntityInput,
        validation::{validate_non_blank, validate_unique_refs},
    },
};

/// Tournament create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TournamentInput {
    /// Tournament name.
    pub name: String,
    /// First day.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub begin: Option<OffsetDateTime>,
    /// Last day; not before the first.
    #[serde(with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub end: Option<OffsetDateTime>,
    /// Organizer in charge; required.
    pub organizer: Option<NamedRef>,
    /// Sponsors, each at most once.
    pub sponsors: Vec<NamedRef>,
    /// Registered players, each at most once.
    pub players: Vec<PlayerRef>,
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// The end day must not precede the begin day; times of day are ignored.
fn ends_before_begin(begin: OffsetDateTime, end: OffsetDateTime) -> bool {
    end.to_offset(UtcOffset::UTC).date() < begin.to_offset(UtcOffset::UTC).date()
}

impl Validate for TournamentInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_non_blank(&self.name) {
            errors.add("name", err);
        }
        if self.organizer.is_none() {
            errors.add("organizer", error("required", "an organizer must be selected"));
        }

        match (self.begin, self.end) {
            (Some(begin), Some(end)) if ends_before_begin(begin, end) => {
                let err = error("order", "the tournament must not end before it begins");
                errors.add("begin", err.clone());
                errors.add("end", err);
            }
            (begin, end) => {
                if begin.is_none() {
                    errors.add("begin", error("required", "must be set"));
                }
                if end.is_none() {
                    errors.add("end", error("required", "must be set"));
                }
            }
        }

        if let Err(err) = validate_unique_refs(&self.sponsors) {
            errors.add("sponsors", err);
        }
        if let Err(err) = validate_unique_refs(&self.players) {
            errors.add("players", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl EntityInput for TournamentInput {
    type Resource = TournamentResource;

    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;
    use crate::dto::validation::ValidationReport;

    fn candidates() -> TournamentInput {
        TournamentInput {
            name: "Candidates".into(),
            begin: Some(datetime!(2024-04-03 14:00 UTC)),
            end: Some(datetime!(2024-04-22 20:00 UTC)),
            organizer: Some(NamedRef {
                id: "1".into(),
                name: "FIDE".into(),
            }),
            ..TournamentInput::default()
        }
    }

    #[test]
    fn complete_tournament_is_valid() {
        assert!(candidates().validate().is_ok());
    }

    #[test]
    fn same_day_with_earlier_end_time_is_accepted() {
        let tournament = TournamentInput {
            begin: Some(datetime!(2024-04-03 18:00 UTC)),
            end: Some(datetime!(2024-04-03 09:00 UTC)),
            ..candidates()
        };
        assert!(tournament.validate().is_ok());
    }

    #[test]
    fn end_on_an_earlier_day_marks_both_bounds() {
        let tournament = TournamentInput {
            end: Some(datetime!(2024-04-02 23:00 UTC)),
            ..candidates()
        };
        let report = ValidationReport::from(&tournament.validate().unwrap_err());
        assert_eq!(report.fields, ["begin", "end"]);
    }

    #[test]
    fn organizer_is_required() {
        let tournament = TournamentInput {
            organizer: None,
            ..candidates()
        };
        let report = ValidationReport::from(&tournament.validate().unwrap_err());
        assert_eq!(report.fields, ["organizer"]);
    }

    #[test]
    fn missing_dates_and_duplicate_players_are_reported() {
        let tal = PlayerRef {
            id: "3".into(),
            last_name: "Tal".into(),
            first_name: "Mikhail".into(),
        };
        let tournament: TournamentInput = serde_json::from_value(json!({
            "name": "Riga Open",
            "organizer": {"id": 1, "name": "LSF"},
        }))
        .unwrap();
        let tournament = TournamentInput {
            players: vec![tal.clone(), tal],
            ..tournament
        };
        let report = ValidationReport::from(&tournament.validate().unwrap_err());
        assert_eq!(report.fields, ["begin", "end", "players"]);
    }
}
