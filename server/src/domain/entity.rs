//! Domain Layer - Identity and Errors
//!
//! Issues and boards are addressed by string ids; every repository and
//! route reports failures as a `DomainError`.

use thiserror::Error;

/// Something stored under a stable id
pub trait Entity: Sized + Send + Sync + Clone {
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    fn id(&self) -> &Self::Id;
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Failures surfaced to API callers. `code()` becomes the envelope error code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    /// Stable machine-readable code used in the response envelope
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::InvalidInput(_) => "INVALID_INPUT",
            DomainError::Conflict(_) => "CONFLICT",
            DomainError::Database(_) => "INTERNAL",
        }
    }
}
