use crate::claims::{ClaimSet, ClaimType, ScopeSet};
use crate::errors::AsError;
use crate::observability::{hash_for_correlation, record_failure};
use crate::repositories::{IdentityProvider, ScopeResourceMap};
use crate::services::claims_service::{assemble_user_claims, display_resources};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Result of an authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    /// The user is signed in; these claims go to the token encoder.
    Issued(ClaimSet),
    /// No authenticated principal; the caller must send a login challenge.
    ChallengeRequired,
}

/// Authorization-code flow: read the signed-in principal and assemble its claims.
///
/// The identity read is raced against `cancel`. Store failures propagate
/// unchanged as `Dependency`. Every error is logged and counted by category.
pub async fn authorize<I, M>(
    identity: &I,
    scope_map: &M,
    scopes: &ScopeSet,
    cancel: &CancellationToken,
) -> Result<AuthorizeOutcome, AsError>
where
    I: IdentityProvider + ?Sized,
    M: ScopeResourceMap + ?Sized,
{
    let principal = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            debug!(target: "as.services.claims", "Authorize request cancelled");
            let err = AsError::Cancelled;
            record_failure("authorize", &err);
            return Err(err);
        }
        result = identity.authenticated_principal() => {
            result.inspect_err(|e| record_failure("authorize", e))?
        }
    };

    let Some(principal) = principal else {
        debug!(
            target: "as.services.claims",
            "No authenticated principal, login challenge required"
        );
        return Ok(AuthorizeOutcome::ChallengeRequired);
    };

    let claims = assemble_user_claims(&principal, scopes, scope_map);

    info!(
        target: "as.services.claims",
        subject = %hash_for_correlation(principal.subject().as_str()),
        role = %principal.role(),
        admin_rights = %principal.admin_rights(),
        scopes = %scopes.to_scope_param(),
        resources = %display_resources(claims.resources()),
        has_username = claims.get(ClaimType::PreferredUsername).is_some(),
        "Authorize: issuing user claims"
    );

    Ok(AuthorizeOutcome::Issued(claims))
}
