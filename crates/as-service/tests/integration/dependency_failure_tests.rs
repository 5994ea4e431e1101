//! Dependency failure and cancellation tests for logout redirect validation
//!
//! Directory errors surface unchanged; they are never turned into a silent
//! fallback, and nothing retries them.

use as_service::errors::AsError;
use as_service::services::redirect_service::{validate_logout_redirect, RedirectPolicy};
use as_test_utils::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_lookup_failure_propagates() {
    let directory = CountingClientDirectory::new(FailingClientDirectory);

    let result = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some(TEST_APP_DONE_URI),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AsError::Dependency(_))));
    assert_eq!(directory.find_calls(), 1);
}

#[tokio::test]
async fn test_enumeration_failure_propagates() {
    let directory = CountingClientDirectory::new(FailingClientDirectory);

    let result = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some(TEST_APP_DONE_URI),
        None,
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AsError::Dependency(msg)) if msg.contains("unreachable")));
    assert_eq!(directory.list_calls(), 1);
}

/// Malformed input is rejected before the directory is touched, so a
/// broken directory does not matter.
#[tokio::test]
async fn test_malformed_uri_does_not_query_directory() -> Result<(), anyhow::Error> {
    let directory = CountingClientDirectory::new(FailingClientDirectory);

    let decision = validate_logout_redirect(
        &directory,
        &RedirectPolicy::default(),
        Some("not-a-uri"),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await?;

    assert!(!decision.accepted());
    assert_eq!(directory.find_calls(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_lookup() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        canceller.cancel();
    });

    let result = validate_logout_redirect(
        &PendingClientDirectory,
        &RedirectPolicy::default(),
        Some(TEST_APP_DONE_URI),
        Some(TEST_CLIENT_WEB_MVC),
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(AsError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_scan() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        canceller.cancel();
    });

    let result = validate_logout_redirect(
        &PendingClientDirectory,
        &RedirectPolicy::default(),
        Some(TEST_APP_DONE_URI),
        None,
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(AsError::Cancelled)));
}
