use crate::errors::AsError;
use crate::models::Principal;

/// Source of the principal authenticated for the current request.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the request is not authenticated and a login
    /// challenge is needed. Store failures are `AsError::Dependency`.
    async fn authenticated_principal(&self) -> Result<Option<Principal>, AsError>;
}
