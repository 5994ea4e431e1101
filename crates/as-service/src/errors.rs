use common::types::EmptyIdentifier;
use thiserror::Error;

/// Errors surfaced by the authorization-server core.
///
/// A rejected logout redirect is not an error: it is a normal
/// [`RedirectDecision`](crate::models::RedirectDecision) with `accepted = false`.
#[derive(Debug, Error)]
pub enum AsError {
    /// Caller handed the core a principal that violates its contract.
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// The identity store or client directory failed. Never retried here.
    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AsError {
    /// Stable machine-readable code for the error, used by calling endpoints.
    pub fn code(&self) -> &'static str {
        match self {
            AsError::InvalidPrincipal(_) => "INVALID_PRINCIPAL",
            AsError::Dependency(_) => "DEPENDENCY_FAILURE",
            AsError::Cancelled => "CANCELLED",
        }
    }
}

impl From<EmptyIdentifier> for AsError {
    fn from(err: EmptyIdentifier) -> Self {
        AsError::InvalidPrincipal(err.to_string())
    }
}
