use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{
    dao::{models::EntityKind, storage::StorageError},
    dto::validation::ValidationReport,
    state::pagination::RemoveError,
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backend could not be reached or answered with a server error.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// No store is attached; the supervisor is still trying to reconnect.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// The backend refused the payload.
    #[error("rejected by backend: {0}")]
    Rejected(String),
    /// The submission failed form validation.
    #[error("validation failed")]
    Invalid(ValidationReport),
    /// A parameter could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The operation clashes with one already in flight.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Not-found error naming the collection and id.
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        ServiceError::NotFound(format!("{kind} `{id}`"))
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rejected { message } => ServiceError::Rejected(message),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Invalid(ValidationReport::from(&errors))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// 400.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// 404.
    #[error("not found: {0}")]
    NotFound(String),
    /// 409.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Rejected form; the report tells the UI which inputs to mark.
    #[error("validation failed")]
    Unprocessable(ValidationReport),
    /// 503.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// 502: the backend sent something unreadable.
    #[error("bad gateway: {0}")]
    BadGateway(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(StorageError::Malformed { message }) => {
                AppError::BadGateway(message)
            }
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Rejected(message) | ServiceError::InvalidInput(message) => {
                AppError::BadRequest(message)
            }
            ServiceError::Invalid(report) => AppError::Unprocessable(report),
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

impl From<RemoveError> for ServiceError {
    fn from(err: RemoveError) -> Self {
        ServiceError::Conflict(err.to_string())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Summary of the failure.
    pub message: String,
    /// Inputs to mark invalid, on 422 only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Details, on 422 only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        };

        let message = self.to_string();
        let payload = match self {
            AppError::Unprocessable(report) => ErrorBody {
                message,
                fields: report.fields,
                messages: report.messages,
            },
            _ => ErrorBody {
                message,
                fields: Vec::new(),
                messages: Vec::new(),
            },
        };

        (status, Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_rejection_is_a_bad_request() {
        let err = ServiceError::from(StorageError::Rejected {
            message: "duplicate name".into(),
        });
        assert!(matches!(AppError::from(err), AppError::BadRequest(m) if m == "duplicate name"));
    }

    #[test]
    fn validation_report_maps_to_422() {
        let report = ValidationReport {
            fields: vec!["name".into()],
            messages: vec!["name: must not be blank".into()],
        };
        let response = AppError::from(ServiceError::Invalid(report)).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn pending_removal_maps_to_409() {
        let err = ServiceError::from(RemoveError::AlreadyRemoving("3".into()));
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
