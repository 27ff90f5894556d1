//! Shared primitives for all Rust crates in Wardgate.

#![forbid(unsafe_code)]

/// Session identity primitives shared across services.
pub mod auth;

use thiserror::Error;

pub use auth::SessionIdentity;

/// Result type used across Wardgate crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
///
/// `Forbidden`, `NotFound`, `InvalidInput` and `Execution` are the outcomes of
/// an authorization decision and its execution. `Unauthorized` and `Internal`
/// belong to the surrounding plumbing.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request: unknown column, primary-key assignment, bad value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No row matched after scope filtering.
    #[error("not found: {0}")]
    NotFound(String),

    /// No authenticated identity is attached to the request.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Role lacks the permission required for the resource and operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Opaque failure reported by the data store.
    #[error("execution error: {0}")]
    Execution(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
