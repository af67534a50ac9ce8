//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the scoring engine.

mod errors;
mod ids;
mod percentage;
mod period;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MetricKey, PlaybookId, ProfileId, SkillCategoryId};
pub use percentage::Percentage;
pub use period::Period;
