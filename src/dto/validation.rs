//! Validation helpers for DTOs and the report returned when a form is rejected.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

use crate::{
    dao::models::{NamedRef, PlayerRef},
    state::schedule::{MatchViolations, PlayerSlot, Violation},
};

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn validate_non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an e-mail address after trimming it.
///
/// ```ignore
/// validate_email_address(" tal@riga.lv ") // Ok
/// validate_email_address("tal@")          // Err
/// ```
pub fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    validate_non_blank(value)?;
    if !value.trim().to_string().validate_email() {
        let mut err = ValidationError::new("email");
        err.message = Some("must be a valid e-mail address".into());
        return Err(err);
    }
    Ok(())
}

/// Anything embedded by id inside another record.
pub trait Referenced {
    /// Id of the embedded record.
    fn ref_id(&self) -> &str;
}

impl Referenced for NamedRef {
    fn ref_id(&self) -> &str {
        &self.id
    }
}

impl Referenced for PlayerRef {
    fn ref_id(&self) -> &str {
        &self.id
    }
}

/// An association list must not contain the same record twice.
pub fn validate_unique_refs<R: Referenced>(refs: &[R]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if let Some(duplicate) = refs.iter().find(|r| !seen.insert(r.ref_id())) {
        let mut err = ValidationError::new("duplicate");
        err.message = Some(format!("`{}` is already attached", duplicate.ref_id()).into());
        return Err(err);
    }
    Ok(())
}

/// `first_name` -> `firstName`, matching the JSON field names the UI binds to.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Invalid-field tags plus one human-readable line per problem.
///
/// Returned with a 422 when a submission is rejected, and always by the match
/// pre-validation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationReport {
    /// De-duplicated tags of the inputs to mark invalid.
    pub fields: Vec<String>,
    /// One line per problem, in detection order.
    pub messages: Vec<String>,
}

impl ValidationReport {
    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<&ValidationErrors> for ValidationReport {
    fn from(errors: &ValidationErrors) -> Self {
        let by_field = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| (to_camel_case(&field.to_string()), errors))
            .collect::<BTreeMap<_, _>>();

        let messages = by_field
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: {}", error.code),
                })
            })
            .collect();

        Self {
            fields: by_field.into_keys().collect(),
            messages,
        }
    }
}

fn player_number(slot: PlayerSlot) -> u8 {
    match slot {
        PlayerSlot::First => 1,
        PlayerSlot::Second => 2,
    }
}

/// User-facing wording of a match rule violation.
pub fn describe_violation(violation: &Violation) -> String {
    match violation {
        Violation::BlankResult => "result must not be blank".into(),
        Violation::EndsBeforeBegin => "the match must not end before it begins".into(),
        Violation::MissingTournament => "a tournament must be selected".into(),
        Violation::MissingPlayer(slot) => {
            format!("player {} must be selected", player_number(*slot))
        }
        Violation::SamePlayer => "players must be different".into(),
        Violation::BeginsBeforeTournament => {
            "the match must not begin before its tournament".into()
        }
        Violation::EndsAfterTournament => "the match must not end after its tournament".into(),
        Violation::DoubleBooked { slot, match_id } => format!(
            "player {} cannot play several matches at the same time (conflicts with match `{match_id}`)",
            player_number(*slot)
        ),
    }
}

impl From<&MatchViolations> for ValidationReport {
    fn from(violations: &MatchViolations) -> Self {
        Self {
            fields: violations
                .fields()
                .into_iter()
                .map(|field| field.as_str().to_string())
                .collect(),
            messages: violations.iter().map(describe_violation).collect(),
        }
    }
}
