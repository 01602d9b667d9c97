use serde::{Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::dao::models::Resource;

/// Club form.
pub mod club;
/// Health check response.
pub mod health;
/// Match form, backend payload and schedule views.
pub mod matches;
/// Organizer form.
pub mod organizer;
/// List query parameters and page responses.
pub mod page;
/// Player form.
pub mod player;
/// Sponsor form.
pub mod sponsor;
/// Tournament form.
pub mod tournament;
/// Validator functions and the 422 report.
pub mod validation;

/// Create/edit form payload of an entity, forwarded upstream once it validates.
pub trait EntityInput: Validate + Serialize + DeserializeOwned + Send + 'static {
    /// Collection the payload is written to.
    type Resource: Resource;

    /// Same payload with free-text fields trimmed, as sent upstream.
    fn normalized(self) -> Self;
}
