//! Error types for session resolution
use thiserror::Error;

use crate::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Identity source unavailable: {reason}")]
    SourceUnavailable { reason: String },
}

impl SessionError {
    /// Check if the identity source could not be reached.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, SessionError::SourceUnavailable { .. })
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        Error::Session(err)
    }
}
