//! Error types shared by the REST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the upstream backend.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing upstream environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build upstream client")]
    ClientBuilder {
        /// Error reported by reqwest.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or no response arrived.
    #[error("failed to send upstream request to `{path}`")]
    RequestSend {
        /// Path of the request.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The backend returned an unexpected status code.
    #[error("unexpected upstream response status {status} for `{path}`")]
    RequestStatus {
        /// Path of the request.
        path: String,
        /// Status the backend answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode upstream response for `{path}`")]
    DecodeResponse {
        /// Path of the request.
        path: String,
        /// Decoding error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        match err {
            RestDaoError::RequestStatus { ref path, status } if status.is_client_error() => {
                StorageError::Rejected {
                    message: format!("upstream answered {status} for `{path}`"),
                }
            }
            RestDaoError::DecodeResponse { ref path, .. } => {
                StorageError::malformed(format!("undecodable upstream payload for `{path}`"))
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
