use crate::claims::{ClaimSet, ClaimSetBuilder, ClaimType, Routing, ScopeSet};
use crate::errors::AsError;
use crate::models::Principal;
use crate::observability::metrics::{record_claims_issued, record_unknown_scope};
use crate::repositories::ScopeResourceMap;
use chrono::{DateTime, SecondsFormat, Utc};
use common::types::ClientId;
use tracing::{debug, info, warn};

/// `account_type` value issued to client-credentials callers.
pub const SERVICE_ACCOUNT_TYPE: &str = "service";

/// Outcome of mapping requested scopes to API resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceResolution {
    /// Resolved resources, deduplicated, in scope order.
    pub resources: Vec<String>,
    /// API scopes with no configured resource.
    pub unknown: Vec<String>,
}

/// Map the requested API scopes to resource identifiers.
///
/// `openid` and `profile` are skipped. Unknown scopes are dropped with a
/// warning and counted; they never fail the request.
pub fn resolve_resources<M>(scopes: &ScopeSet, scope_map: &M) -> ResourceResolution
where
    M: ScopeResourceMap + ?Sized,
{
    let mut resolution = ResourceResolution::default();

    for scope in scopes.api_scopes() {
        match scope_map.resolve_resource(scope) {
            Some(resource) => {
                if !resolution.resources.contains(&resource) {
                    resolution.resources.push(resource);
                }
            }
            None => {
                warn!(
                    target: "as.services.claims",
                    scope = %scope,
                    "Unknown API scope requested, no resource mapping configured"
                );
                record_unknown_scope();
                resolution.unknown.push(scope.to_string());
            }
        }
    }

    resolution
}

fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Build the claims for an interactive user.
///
/// Every claim type is set once. Destinations follow
/// [`destinations`](crate::claims::destinations), so `admin_rights` reaches the
/// access token only and `preferred_username` needs the `profile` scope.
pub fn assemble_user_claims<M>(principal: &Principal, scopes: &ScopeSet, scope_map: &M) -> ClaimSet
where
    M: ScopeResourceMap + ?Sized,
{
    let resolution = resolve_resources(scopes, scope_map);
    let created_at = principal.created_at().map(format_timestamp);
    let updated_at = principal.updated_at().map(format_timestamp);

    let claims = ClaimSetBuilder::new()
        .claim(ClaimType::Subject, principal.subject().as_str())
        .optional_claim(ClaimType::Email, principal.email())
        .optional_claim(ClaimType::PreferredUsername, principal.username())
        .claim(ClaimType::Role, principal.role().as_str())
        .claim(ClaimType::AdminRights, principal.admin_rights().to_string())
        .optional_claim(ClaimType::CreatedAt, created_at.as_deref())
        .optional_claim(ClaimType::UpdatedAt, updated_at.as_deref())
        .build(scopes.clone(), resolution.resources, Routing::PerClaimType);

    log_destinations(&claims);
    record_claims_issued("user");
    claims
}

/// Build the claims for a client-credentials (service) caller.
///
/// The subject is the client id itself and every claim goes to the access
/// token only: service callers receive no ID token.
///
/// # Errors
///
/// `InvalidPrincipal` if `client_id` is blank.
pub fn assemble_service_claims<M>(
    client_id: &str,
    scopes: &ScopeSet,
    scope_map: &M,
) -> Result<ClaimSet, AsError>
where
    M: ScopeResourceMap + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    let resolution = resolve_resources(scopes, scope_map);

    let claims = ClaimSetBuilder::new()
        .claim(ClaimType::Subject, client_id.as_str())
        .claim(ClaimType::AccountType, SERVICE_ACCOUNT_TYPE)
        .build(scopes.clone(), resolution.resources, Routing::AccessTokenOnly);

    info!(
        target: "as.services.claims",
        client_id = %client_id,
        scopes = %claims.scopes().to_scope_param(),
        resources = %display_resources(claims.resources()),
        "Issuing client-credentials claims"
    );
    log_destinations(&claims);
    record_claims_issued("service");
    Ok(claims)
}

/// Comma-joined resources, `<none>` when empty.
pub(crate) fn display_resources(resources: &[String]) -> String {
    if resources.is_empty() {
        "<none>".to_string()
    } else {
        resources.join(", ")
    }
}

// Values are not logged: they include personal data.
fn log_destinations(claims: &ClaimSet) {
    for claim in claims.iter() {
        debug!(
            target: "as.services.claims",
            claim_type = %claim.claim_type(),
            destinations = %claim.destinations(),
            "Claim routed"
        );
    }
}
