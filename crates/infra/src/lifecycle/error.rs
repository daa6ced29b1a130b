use thiserror::Error;

use antiwaste_auth::AuthzError;
use antiwaste_core::DomainError;

use crate::repository::RepositoryError;

/// Failure of a lifecycle use case.
///
/// Domain errors pass through untouched; storage errors are kept apart so the
/// transport can report them as server faults.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl From<AuthzError> for LifecycleError {
    fn from(err: AuthzError) -> Self {
        LifecycleError::Domain(err.into())
    }
}

impl LifecycleError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LifecycleError::Domain(e) => Some(e),
            LifecycleError::Store(_) => None,
        }
    }
}
