//! Custom test assertions for expressive tests

use as_service::claims::{ClaimSet, ClaimType, TokenDestinations, TokenType};
use as_service::models::{RedirectDecision, RejectionReason, SAFE_FALLBACK_URI};

/// Custom assertions for assembled claim sets
///
/// # Example
/// ```rust,ignore
/// claims
///     .assert_claim(ClaimType::Subject, &TEST_USER_ALICE.to_string())
///     .assert_access_token_only(ClaimType::AdminRights)
///     .assert_not_in_token(ClaimType::Email, TokenType::IdentityToken);
/// ```
pub trait ClaimSetAssertions {
    /// Assert the claim is present with the given value
    fn assert_claim(&self, claim_type: ClaimType, value: &str) -> &Self;

    /// Assert the claim was never constructed
    fn assert_absent(&self, claim_type: ClaimType) -> &Self;

    /// Assert the claim is present with exactly these destinations
    fn assert_destinations(&self, claim_type: ClaimType, expected: TokenDestinations) -> &Self;

    /// Assert the claim is routed to the access token and nowhere else
    fn assert_access_token_only(&self, claim_type: ClaimType) -> &Self;

    /// Assert the claim does not reach the given token (absent or not routed)
    fn assert_not_in_token(&self, claim_type: ClaimType, token: TokenType) -> &Self;

    /// Assert the resolved audiences, in order
    fn assert_resources(&self, expected: &[&str]) -> &Self;
}

impl ClaimSetAssertions for ClaimSet {
    fn assert_claim(&self, claim_type: ClaimType, value: &str) -> &Self {
        assert_eq!(
            self.value(claim_type),
            Some(value),
            "Unexpected value for claim '{}'",
            claim_type
        );
        self
    }

    fn assert_absent(&self, claim_type: ClaimType) -> &Self {
        assert!(
            self.get(claim_type).is_none(),
            "Claim '{}' should be absent, found {:?}",
            claim_type,
            self.value(claim_type)
        );
        self
    }

    fn assert_destinations(&self, claim_type: ClaimType, expected: TokenDestinations) -> &Self {
        let claim = self
            .get(claim_type)
            .unwrap_or_else(|| panic!("Claim '{}' is missing", claim_type));
        assert_eq!(
            claim.destinations(),
            expected,
            "Claim '{}' routed to [{}], expected [{}]",
            claim_type,
            claim.destinations(),
            expected
        );
        self
    }

    fn assert_access_token_only(&self, claim_type: ClaimType) -> &Self {
        self.assert_destinations(claim_type, TokenDestinations::ACCESS_TOKEN_ONLY)
    }

    fn assert_not_in_token(&self, claim_type: ClaimType, token: TokenType) -> &Self {
        assert!(
            self.value_in(claim_type, token).is_none(),
            "Claim '{}' must not appear in the {}",
            claim_type,
            token.as_str()
        );
        self
    }

    fn assert_resources(&self, expected: &[&str]) -> &Self {
        let actual: Vec<&str> = self.resources().iter().map(String::as_str).collect();
        assert_eq!(actual, expected, "Unexpected resources");
        self
    }
}

/// Custom assertions for redirect decisions
pub trait RedirectDecisionAssertions {
    /// Assert the request was accepted and resolved to `registered_uri`
    fn assert_accepted_as(&self, registered_uri: &str) -> &Self;

    /// Assert the user goes to the fallback for the given reason
    fn assert_rejected(&self, reason: RejectionReason) -> &Self;

    /// Assert the fallback was used because nothing was requested
    fn assert_not_requested(&self) -> &Self;
}

impl RedirectDecisionAssertions for RedirectDecision {
    fn assert_accepted_as(&self, registered_uri: &str) -> &Self {
        assert!(
            self.accepted(),
            "Expected accepted redirect, got rejection {:?}",
            self.rejection()
        );
        assert_eq!(self.approved_uri(), registered_uri);
        assert_eq!(self.rejection(), None);
        self
    }

    fn assert_rejected(&self, reason: RejectionReason) -> &Self {
        assert!(!self.accepted(), "Expected rejection, redirect was accepted");
        assert_eq!(self.approved_uri(), SAFE_FALLBACK_URI);
        assert_eq!(self.rejection(), Some(reason));
        self
    }

    fn assert_not_requested(&self) -> &Self {
        assert!(!self.accepted());
        assert_eq!(self.approved_uri(), SAFE_FALLBACK_URI);
        assert_eq!(self.rejection(), None, "No rejection expected when nothing was requested");
        self
    }
}
