//! The module contains the errors the engine can throw.
//!
//! The variants follow the failure taxonomy of the scheduling core:
//!
//! - [`Validation`] malformed or missing input, caught before any I/O.
//! - [`Conflict`] slot overlap detected at creation or at approval.
//! - [`IllegalState`] operation attempted from a status that forbids it.
//! - [`Forbidden`] actor role not permitted for the requested transition.
//! - [`Parse`] time-of-day parsing failure.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Conflict`]: EngineError::Conflict
//!  [`IllegalState`]: EngineError::IllegalState
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`Parse`]: EngineError::Parse
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid {0}")]
    Validation(String),
    #[error("Schedule conflict: {0}")]
    Conflict(String),
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::IllegalState(a), Self::IllegalState(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Parse(a), Self::Parse(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
