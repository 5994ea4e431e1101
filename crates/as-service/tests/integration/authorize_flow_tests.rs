//! Integration tests for the authorize flow
//!
//! Drives `authorize` with fake identity providers: signed-in, anonymous,
//! failing and never-answering.

use as_service::claims::{ClaimType, ScopeSet, TokenType};
use as_service::errors::AsError;
use as_service::services::authorize_service::{authorize, AuthorizeOutcome};
use as_test_utils::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_signed_in_user_gets_claims() -> Result<(), anyhow::Error> {
    // Arrange
    let principal = TestPrincipalBuilder::new()
        .for_user(TEST_USER_BOB)
        .with_username("bob")
        .with_admin_rights(2)
        .try_build()?;
    let identity = FakeIdentityProvider::signed_in(principal);

    // Act
    let outcome = authorize(
        &identity,
        &test_scope_map(),
        &ScopeSet::from_scope_param("openid profile banking_api"),
        &CancellationToken::new(),
    )
    .await?;

    // Assert
    let claims = match outcome {
        AuthorizeOutcome::Issued(claims) => claims,
        other => anyhow::bail!("expected issued claims, got {:?}", other),
    };
    claims
        .assert_claim(ClaimType::Subject, &TEST_USER_BOB.to_string())
        .assert_claim(ClaimType::Role, "Employee")
        .assert_claim(ClaimType::PreferredUsername, "bob")
        .assert_access_token_only(ClaimType::AdminRights)
        .assert_resources(&[RESOURCE_BANKING_API]);
    assert_eq!(identity.call_count(), 1);

    let id_token = claims.token_payload(TokenType::IdentityToken);
    assert_eq!(
        id_token.get("preferred_username").and_then(|v| v.as_str()),
        Some("bob")
    );

    Ok(())
}

#[tokio::test]
async fn test_anonymous_request_needs_challenge() -> Result<(), anyhow::Error> {
    let outcome = authorize(
        &FakeIdentityProvider::anonymous(),
        &test_scope_map(),
        &ScopeSet::from_scope_param("openid"),
        &CancellationToken::new(),
    )
    .await?;

    assert_eq!(outcome, AuthorizeOutcome::ChallengeRequired);
    Ok(())
}

#[tokio::test]
async fn test_identity_store_failure_propagates() {
    let identity = FakeIdentityProvider::failing();

    let result = authorize(
        &identity,
        &test_scope_map(),
        &ScopeSet::from_scope_param("openid"),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AsError::Dependency(_))));
    assert_eq!(identity.call_count(), 1, "Failures are not retried");
}

/// A hung identity store is abandoned once the caller cancels.
#[tokio::test(start_paused = true)]
async fn test_cancellation_while_waiting_for_identity() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        canceller.cancel();
    });

    let result = authorize(
        &PendingIdentityProvider,
        &test_scope_map(),
        &ScopeSet::from_scope_param("openid"),
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(AsError::Cancelled)));
}
