use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{NamedRef, OrganizerResource},
    dto::{
        EntityInput,
        validation::{validate_non_blank, validate_unique_refs},
    },
};

/// Organizer create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct OrganizerInput {
    /// Organizer name.
    #[validate(custom(function = "validate_non_blank"))]
    pub name: String,
    /// Organized tournaments, each at most once.
    #[validate(custom(function = "validate_unique_refs"))]
    pub tournaments: Vec<NamedRef>,
}

impl EntityInput for OrganizerInput {
    type Resource = OrganizerResource;

    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            ..self
        }
    }
}
