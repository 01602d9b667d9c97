use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{NamedRef, SponsorResource},
    dto::{
        EntityInput,
        validation::{validate_non_blank, validate_unique_refs},
    },
};

/// Sponsor create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct SponsorInput {
    /// Sponsor name.
    #[validate(custom(function = "validate_non_blank"))]
    pub name: String,
    /// Sponsored tournaments, each at most once.
    #[validate(custom(function = "validate_unique_refs"))]
    pub tournaments: Vec<NamedRef>,
}

impl EntityInput for SponsorInput {
    type Resource = SponsorResource;

    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    fn open(id: &str) -> NamedRef {
        NamedRef {
            id: id.into(),
            name: "Aeroflot Open".into(),
        }
    }

    #[test]
    fn sponsor_needs_a_name() {
        let sponsor = SponsorInput {
            name: " ".into(),
            tournaments: vec![open("1")],
        };
        assert!(sponsor.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn tournament_is_sponsored_once() {
        let sponsor = SponsorInput {
            name: "Chessbase".into(),
            tournaments: vec![open("1"), open("2"), open("1")],
        };
        let errors = sponsor.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("tournaments"));
        assert!(!errors.field_errors().contains_key("name"));
    }
}
