//! Progress error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),

    #[error("Cannot merge mastery records of different profile/skill pairs")]
    MismatchedMasteryRecord,
}

impl From<ProgressError> for DomainError {
    fn from(err: ProgressError) -> Self {
        let code = match &err {
            ProgressError::InvalidLevelTable(_) => ErrorCode::InvalidLevelTable,
            ProgressError::MismatchedMasteryRecord => ErrorCode::ValidationFailed,
        };
        DomainError::new(code, err.to_string())
    }
}
