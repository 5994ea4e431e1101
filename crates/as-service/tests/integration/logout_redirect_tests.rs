//! Integration tests for post-logout redirect validation
//!
//! Exercises the validator against an in-memory client directory, with and
//! without a client id, in both matching modes.

use as_service::models::RejectionReason;
use as_service::repositories::InMemoryClientDirectory;
use as_service::services::redirect_service::{
    validate_logout_redirect, RedirectPolicy, UriMatching,
};
use as_test_utils::*;
use tokio_util::sync::CancellationToken;

const OTHER_APP_URI: &str = "https://other.example/bye";

/// web-mvc registers the app URI; blazor-wasm registers its own and another.
fn directory() -> InMemoryClientDirectory {
    InMemoryClientDirectory::with_clients([
        TestClientBuilder::confidential(TEST_CLIENT_WEB_MVC)
            .with_post_logout_uri(TEST_APP_DONE_URI)
            .build(),
        TestClientBuilder::public(TEST_CLIENT_BLAZOR_WASM)
            .with_post_logout_uri(TEST_WASM_SIGNOUT_URI)
            .with_post_logout_uri(OTHER_APP_URI)
            .build(),
    ])
}

fn strict() -> RedirectPolicy {
    RedirectPolicy {
        matching: UriMatching::Strict,
        ..RedirectPolicy::default()
    }
}

// ============================================================================
// Nothing or garbage requested
// ============================================================================

#[tokio::test]
async fn test_absent_uri_falls_back() -> Result<(), anyhow::Error> {
    let directory = directory();

    for client_id in [None, Some(TEST_CLIENT_WEB_MVC)] {
        let decision = validate_logout_redirect(
            &directory,
            &RedirectPolicy::default(),
            None,
            client_id,
            &CancellationToken::new(),
        )
        .await?;

        decision.assert_not_requested();
    }

    Ok(())
}

#[tokio::test]
async fn test_malformed_uri_falls_back() -> Result<(), anyhow::Error> {
    let directory = directory();

    for requested in ["not-a-uri", "/relative/path", "//app.example/done", "https://"] {
        let decision = validate_logout_redirect(
            &directory,
            &RedirectPolicy::default(),
            Some(requested),
            Some(TEST_CLIENT_WEB_MVC),
            &CancellationToken::new(),
        )
        .await?;

        decision.assert_rejected(RejectionReason::MalformedUri);
    }

    Ok(())
}

// ============================================================================
// With client id
// ============================================================================

/// Case and a trailing slash do not matter; the registered form is returned.
#[tokio::test]
async fn test_canonical_match_returns_registered_uri() -> Result<(), anyhow::Error> {
    // Arrange
    let directory = directory();

    // Act
    let decision = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some("https://APP.EXAMPLE/done/"),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await?;

    // Assert
    decision.assert_accepted_as(TEST_APP_DONE_URI);
    Ok(())
}

/// Lenient mode ignores the query string.
#[tokio::test]
async fn test_lenient_ignores_query() -> Result<(), anyhow::Error> {
    let decision = validate_logout_redirect(
        &directory(),
        &RedirectPolicy::default(),
        Some("https://app.example/done?x=1"),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_accepted_as(TEST_APP_DONE_URI);
    Ok(())
}

/// Strict mode requires query and fragment to match exactly.
#[tokio::test]
async fn test_strict_requires_exact_query_and_fragment() -> Result<(), anyhow::Error> {
    let directory = directory();
    let cancel = CancellationToken::new();

    let with_query = validate_logout_redirect(
        &directory,
        &strict(),
        Some("https://app.example/done?x=1"),
        Some(TEST_CLIENT_WEB_MVC),
        &cancel,
    )
    .await?;
    with_query.assert_rejected(RejectionReason::UnregisteredUri);

    let with_fragment = validate_logout_redirect(
        &directory,
        &strict(),
        Some("https://app.example/done#top"),
        Some(TEST_CLIENT_WEB_MVC),
        &cancel,
    )
    .await?;
    with_fragment.assert_rejected(RejectionReason::UnregisteredUri);

    let exact = validate_logout_redirect(
        &directory,
        &strict(),
        Some("https://app.example/done/"),
        Some(TEST_CLIENT_WEB_MVC),
        &cancel,
    )
    .await?;
    exact.assert_accepted_as(TEST_APP_DONE_URI);

    Ok(())
}

/// An unknown client id is rejected even though another client registers the URI.
#[tokio::test]
async fn test_unknown_client_has_no_directory_fallback() -> Result<(), anyhow::Error> {
    let directory = CountingClientDirectory::new(directory());

    let decision = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some(TEST_APP_DONE_URI),
        Some("attacker-client"),
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_rejected(RejectionReason::UnknownClient);
    assert_eq!(directory.find_calls(), 1);
    assert_eq!(directory.list_calls(), 0, "No directory scan for a named client");

    Ok(())
}

/// A URI registered only by a different client is rejected for this client.
#[tokio::test]
async fn test_uri_of_other_client_is_rejected() -> Result<(), anyhow::Error> {
    let decision = validate_logout_redirect(
        &directory(),
        &RedirectPolicy::default(),
        Some(OTHER_APP_URI),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_rejected(RejectionReason::UnregisteredUri);
    Ok(())
}

/// Look-alike hosts and paths do not match.
#[tokio::test]
async fn test_open_redirect_attempts_rejected() -> Result<(), anyhow::Error> {
    let directory = directory();

    for requested in [
        "https://app.example.evil.com/done",
        "https://evil.com/?next=https://app.example/done",
        "http://app.example/done",
        "https://app.example/done/../admin",
        "https://app.example:8443/done",
        "javascript:alert(1)",
    ] {
        let decision = validate_logout_redirect(
            &directory,
            &RedirectPolicy::default(),
            Some(requested),
            Some(TEST_CLIENT_WEB_MVC),
            &CancellationToken::new(),
        )
        .await?;

        assert!(!decision.accepted(), "{} must not be accepted", requested);
        assert_eq!(decision.approved_uri(), "/");
    }

    Ok(())
}

// ============================================================================
// Without client id
// ============================================================================

/// Any client's registration is enough when no client id is given.
#[tokio::test]
async fn test_directory_scan_accepts_any_registered_uri() -> Result<(), anyhow::Error> {
    let decision = validate_logout_redirect(
        &directory(),
        &RedirectPolicy::default(),
        Some("https://other.example/BYE"),
        None,
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_accepted_as(OTHER_APP_URI);
    Ok(())
}

#[tokio::test]
async fn test_directory_scan_rejects_unregistered_uri() -> Result<(), anyhow::Error> {
    let directory = CountingClientDirectory::new(InMemoryClientDirectory::with_clients(
        numbered_clients(25),
    ));
    let policy = RedirectPolicy {
        page_size: 10,
        ..RedirectPolicy::default()
    };

    let decision = validate_logout_redirect(
        &directory,
        &policy,
        Some("https://nobody.example/signed-out"),
        None,
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_rejected(RejectionReason::UnregisteredUri);
    // 10 + 10 + 5: the short third page ends the scan
    assert_eq!(directory.list_calls(), 3);

    Ok(())
}

/// The scan stops at the page holding the first match.
#[tokio::test]
async fn test_directory_scan_stops_at_first_match() -> Result<(), anyhow::Error> {
    let directory = CountingClientDirectory::new(InMemoryClientDirectory::with_clients(
        numbered_clients(50),
    ));
    let policy = RedirectPolicy {
        page_size: 10,
        ..RedirectPolicy::default()
    };

    // client-012 lives on the second page
    let decision = validate_logout_redirect(
        &directory,
        &policy,
        Some("https://client-012.example/signed-out"),
        None,
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_accepted_as("https://client-012.example/signed-out");
    assert_eq!(directory.list_calls(), 2);

    Ok(())
}

/// With scanning disabled a missing client id is rejected outright.
#[tokio::test]
async fn test_scan_disabled_requires_client_id() -> Result<(), anyhow::Error> {
    let directory = CountingClientDirectory::new(directory());
    let policy = RedirectPolicy {
        allow_directory_scan: false,
        ..RedirectPolicy::default()
    };

    let decision = validate_logout_redirect(
        &directory,
        &policy,
        Some(TEST_APP_DONE_URI),
        None,
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_rejected(RejectionReason::ClientIdRequired);
    assert_eq!(directory.list_calls(), 0);

    Ok(())
}

/// Registered entries that are not absolute URIs never match.
#[tokio::test]
async fn test_relative_registration_is_skipped() -> Result<(), anyhow::Error> {
    let directory = InMemoryClientDirectory::with_clients([TestClientBuilder::public("legacy")
        .with_post_logout_uri("/signed-out")
        .with_post_logout_uri("https://legacy.example/signed-out")
        .build()]);

    let decision = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some("https://legacy.example/signed-out"),
        Some("legacy"),
        &CancellationToken::new(),
    )
    .await?;

    decision.assert_accepted_as("https://legacy.example/signed-out");
    Ok(())
}
