//! UseCase error types.

use thiserror::Error;

use crate::domain::RepositoryError;

/// Errors while opening a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("failed to register session: {0}")]
    Registration(#[from] RepositoryError),
}
