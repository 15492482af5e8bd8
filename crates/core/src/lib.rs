//! Shared primitives for all Rust crates in leaderhook.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across leaderhook crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or contradictory runtime configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The coordination service could not be reached or rejected a call.
    #[error("coordination error: {0}")]
    Coordination(String),

    /// Outbound notification could not reach its destination.
    #[error("transport error: {0}")]
    Transport(String),

    /// A lease observation carried no holder identity.
    #[error("lease '{0}' has no holder identity")]
    MissingHolderIdentity(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
