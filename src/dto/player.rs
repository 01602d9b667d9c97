use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{NamedRef, PlayerResource},
    dto::{
        EntityInput,
        validation::{validate_email_address, validate_non_blank},
    },
};

/// Player create/edit form. The committed `matches` list is owned by the backend and
/// never sent from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerInput {
    /// Given name.
    #[validate(custom(function = "validate_non_blank"))]
    pub first_name: String,
    /// Family name, also the picker label.
    #[validate(custom(function = "validate_non_blank"))]
    pub last_name: String,
    /// Postal address.
    #[validate(custom(function = "validate_non_blank"))]
    pub address: String,
    /// Phone number.
    #[validate(custom(function = "validate_non_blank"))]
    pub tel: String,
    /// Contact e-mail.
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    /// Rating or title.
    #[validate(custom(function = "validate_non_blank"))]
    pub rank: String,
    /// Club the player belongs to.
    pub club: Option<NamedRef>,
}

impl EntityInput for PlayerInput {
    type Resource = PlayerResource;

    fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            address: self.address.trim().to_string(),
            tel: self.tel.trim().to_string(),
            email: self.email.trim().to_string(),
            rank: self.rank.trim().to_string(),
            club: self.club,
        }
    }
}
