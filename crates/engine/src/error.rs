//! The module contains the errors the engine can produce.
//!
//! They follow the three failure families of the tracker:
//!
//! - [`ValidationError`] malformed local input, never reaches the store.
//! - [`AuthError`] sign-in rejected by the identity provider.
//! - [`StoreError`] a read or write rejected by the document store.
//!
//! [`EngineError`] aggregates them for callers that do not care which layer
//! failed.
use sea_orm::DbErr;
use thiserror::Error;

/// Local input rejected before any write is issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category must not be empty")]
    MissingCategory,
    #[error("date must not be empty")]
    MissingDate,
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("amount must not be empty")]
    MissingAmount,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("display name must not be empty")]
    EmptyDisplayName,
}

/// Failures reported by the identity provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider refuses sign-ins coming from this domain. It is a
    /// configuration problem the user can fix, so it carries the domain.
    #[error("sign-in from domain \"{domain}\" is not permitted")]
    DomainNotPermitted { domain: String },
    #[error("sign-in rejected: {0}")]
    Rejected(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Whether the error is the actionable "domain not permitted" case.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::DomainNotPermitted { .. })
    }
}

/// Failures reported by a document store.
///
/// The type is `Clone` because failed snapshots travel through watch
/// channels next to successful ones.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("\"{0}\" document not found!")]
    NotFound(String),
    #[error("permission denied on \"{0}\"")]
    PermissionDenied(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("write failed: {0}")]
    Write(#[from] StoreError),
    #[error("no user is signed in")]
    NotAuthenticated,
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("no expense form is open")]
    NoOpenForm,
    #[error("no delete is waiting for confirmation")]
    NoPendingDelete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_become_database_store_errors() {
        let err: StoreError = DbErr::Custom("disk full".to_string()).into();
        assert!(matches!(err, StoreError::Database(ref msg) if msg.contains("disk full")));
    }

    #[test]
    fn domain_errors_are_flagged() {
        let err = AuthError::DomainNotPermitted {
            domain: "example.org".to_string(),
        };
        assert!(err.is_domain_error());
        assert!(!AuthError::Rejected("nope".to_string()).is_domain_error());
    }
}
