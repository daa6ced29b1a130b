//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// business rules, state machine violations). Infrastructure concerns belong
/// elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing required input to a constructor or mutator.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A business rule forbids the operation (e.g. price not below the
    /// original price, seller not approved).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An operation was invoked while the entity's state forbids it.
    #[error("invalid state transition: cannot {operation} while {from}")]
    InvalidStateTransition { from: String, operation: String },

    /// Content required for moderation is missing.
    #[error("incomplete content: missing {}", .0.join(", "))]
    IncompleteContent(Vec<String>),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated (e.g. second seller profile for a user).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The acting principal may not perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn invalid_transition(from: impl core::fmt::Display, operation: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            operation: operation.into(),
        }
    }

    pub fn incomplete<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::IncompleteContent(missing.into_iter().map(Into::into).collect())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_state_and_operation() {
        let err = DomainError::invalid_transition("DRAFT", "validate");
        assert_eq!(
            err.to_string(),
            "invalid state transition: cannot validate while DRAFT"
        );
    }

    #[test]
    fn incomplete_content_lists_missing_fields() {
        let err = DomainError::incomplete(["title", "price"]);
        assert_eq!(err.to_string(), "incomplete content: missing title, price");
    }
}
