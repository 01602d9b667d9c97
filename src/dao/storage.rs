use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of how they reach the data.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or failed.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was attempted.
        message: String,
        /// Underlying transport or server error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend answered but refused the request (4xx other than 404).
    #[error("storage rejected request: {message}")]
    Rejected {
        /// Reason given by the backend.
        message: String,
    },
    /// A record could not be mapped onto the expected model.
    #[error("malformed record: {message}")]
    Malformed {
        /// What could not be decoded.
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a malformed-record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        StorageError::Malformed {
            message: message.into(),
        }
    }
}
