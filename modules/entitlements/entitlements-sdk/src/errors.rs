//! Public error types for the `entitlements` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// A single invalid input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that can be returned by the `EntitlementsApi`.
#[derive(Error, Debug, Clone)]
pub enum EntitlementsError {
    /// The referenced client, plan or module does not exist.
    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    /// The operation conflicts with existing state.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Malformed or missing input.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        violations: Vec<FieldViolation>,
    },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl EntitlementsError {
    pub fn not_found(resource: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            key: key.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self::Validation {
            message: message.into(),
            violations,
        }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
