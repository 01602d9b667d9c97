use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{ClubResource, PlayerRef},
    dto::{EntityInput, validation::validate_unique_refs},
};

/// Club create/edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct ClubInput {
    /// Club name.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    /// Postal address.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub address: String,
    /// Members; a player can only be attached once.
    #[validate(custom(function = "validate_unique_refs"))]
    pub players: Vec<PlayerRef>,
}

impl EntityInput for ClubInput {
    type Resource = ClubResource;

    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            ..self
        }
    }
}
