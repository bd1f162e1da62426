use serde::Serialize;
use thiserror::Error;

use crate::dao::{queue::QueueError, storage::StorageError};

/// Errors that can occur in service layer operations.
///
/// Collaborator I/O failures end up here; advisory protocol situations (bad
/// hand, unknown session) never do, since those are well-formed payloads
/// steering the client back to a valid state.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend call failed.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Pending queue call failed.
    #[error("pending queue unavailable")]
    QueueUnavailable(#[source] QueueError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Persisted state was observed in a shape the engine cannot act on.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<QueueError> for ServiceError {
    fn from(err: QueueError) -> Self {
        ServiceError::QueueUnavailable(err)
    }
}

/// Structured failure body pushed to a client when a request could not be
/// served. Carries the service-level message only, never backend detail.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
