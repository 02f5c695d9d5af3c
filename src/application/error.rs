//! # Application Errors
//!
//! Error types for use-case execution.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)           - Business-rule violations
//! ├── Repository(RepositoryError)   - Storage failures
//! └── NotFound                      - Referenced entity absent
//! ```
//!
//! Every rejected use case surfaces the specific error and leaves all
//! entities exactly as before the call.

use crate::domain::errors::DomainError;
use crate::infrastructure::persistence::traits::RepositoryError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Business-rule violation from the domain layer.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Storage failure from a repository.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// A referenced entity does not exist.
    #[error("not found: {entity_type} {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },
}

impl ApplicationError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Returns the wrapped domain error, if any.
    #[must_use]
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the failure is a deal-transition guard rejection.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        self.as_domain()
            .is_some_and(DomainError::is_invalid_transition)
    }

    /// Returns true if the failure is an authorization rejection.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.as_domain().is_some_and(DomainError::is_unauthorized)
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ActorKind, DealId, DealStatus};

    #[test]
    fn wraps_domain_errors() {
        let err: ApplicationError = DomainError::InvalidTransition {
            deal_id: DealId::nil(),
            from: DealStatus::Paid,
            to: DealStatus::Negotiation,
        }
        .into();
        assert!(err.is_invalid_transition());
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn wraps_unauthorized() {
        let err: ApplicationError =
            DomainError::unauthorized(ActorKind::Client, "nope").into();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn not_found_display() {
        let err = ApplicationError::not_found("Deal", DealId::nil());
        assert!(err.to_string().contains("Deal"));
    }
}
