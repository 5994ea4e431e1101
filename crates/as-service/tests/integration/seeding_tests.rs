//! Integration tests for client seeding
//!
//! Loads clients from configuration variables, seeds them into the in-memory
//! directory and validates logout redirects against the result.

use as_service::config::{Config, ConfigError};
use as_service::repositories::{ClientDirectory, InMemoryClientDirectory};
use as_service::services::redirect_service::validate_logout_redirect;
use as_service::services::seeding_service::{seed_clients, SeedReport};
use as_test_utils::*;
use common::types::ClientId;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

fn vars(clients_json: &str) -> HashMap<String, String> {
    HashMap::from([
        (
            "AS_ISSUER_URI".to_string(),
            "https://localhost:7001/".to_string(),
        ),
        ("AS_CLIENTS".to_string(), clients_json.to_string()),
        (
            "AS_CLIENT_SECRET_WEB_MVC".to_string(),
            TEST_CLIENT_SECRET.to_string(),
        ),
        ("AS_LOGOUT_ALLOW_DIRECTORY_SCAN".to_string(), "false".to_string()),
    ])
}

const CLIENTS: &str = r#"[
    {
        "client_id": "blazor-wasm",
        "display_name": "Blazor WASM",
        "client_type": "public",
        "redirect_uris": ["https://localhost:7002/authentication/login-callback"],
        "post_logout_redirect_uris": ["https://localhost:7002/authentication/logout-callback"]
    },
    {
        "client_id": "web-mvc",
        "display_name": "Web MVC",
        "client_type": "confidential",
        "redirect_uris": ["https://localhost:7003/signin-oidc"],
        "post_logout_redirect_uris": ["https://localhost:7003/signout-callback-oidc"]
    }
]"#;

#[tokio::test]
async fn test_seeded_clients_drive_redirect_validation() -> Result<(), anyhow::Error> {
    // Arrange
    let config = Config::from_vars(&vars(CLIENTS))?;
    let directory = InMemoryClientDirectory::new();

    // Act
    let report = seed_clients(&directory, &config.clients).await?;

    // Assert
    assert_eq!(report, SeedReport { created: 2, updated: 0 });

    let decision = validate_logout_redirect(
        &directory,
        &config.redirect_policy,
        Some(TEST_MVC_SIGNOUT_URI),
        Some(TEST_CLIENT_WEB_MVC),
        &CancellationToken::new(),
    )
    .await?;
    decision.assert_accepted_as(TEST_MVC_SIGNOUT_URI);

    // Scanning is disabled in this configuration
    let decision = validate_logout_redirect(
        &directory,
        &config.redirect_policy,
        Some(TEST_WASM_SIGNOUT_URI),
        None,
        &CancellationToken::new(),
    )
    .await?;
    decision.assert_rejected(as_service::models::RejectionReason::ClientIdRequired);

    Ok(())
}

/// Seeding the same registrations again updates in place.
#[tokio::test]
async fn test_seeding_twice_updates_in_place() -> Result<(), anyhow::Error> {
    let directory = InMemoryClientDirectory::new();
    let first = vec![TestClientBuilder::public(TEST_CLIENT_BLAZOR_WASM)
        .with_post_logout_uri(TEST_WASM_SIGNOUT_URI)
        .registration(None)];

    seed_clients(&directory, &first).await?;

    let second = vec![TestClientBuilder::public(TEST_CLIENT_BLAZOR_WASM)
        .with_display_name("Blazor WASM v2")
        .with_post_logout_uri("https://localhost:7002/goodbye")
        .registration(None)];
    let report = seed_clients(&directory, &second).await?;

    assert_eq!(report, SeedReport { created: 0, updated: 1 });
    assert_eq!(directory.len().await, 1);

    let stored = directory
        .find_client(&ClientId::new(TEST_CLIENT_BLAZOR_WASM)?)
        .await?
        .ok_or_else(|| anyhow::anyhow!("client missing after reseed"))?;
    assert_eq!(stored.display_name, "Blazor WASM v2");
    assert!(stored
        .post_logout_redirect_uris
        .contains("https://localhost:7002/goodbye"));
    assert!(!stored.post_logout_redirect_uris.contains(TEST_WASM_SIGNOUT_URI));

    Ok(())
}

/// A confidential client without a secret is refused at load and at seed time.
#[tokio::test]
async fn test_confidential_client_without_secret_fails() {
    let mut vars = vars(CLIENTS);
    vars.remove("AS_CLIENT_SECRET_WEB_MVC");
    assert!(matches!(
        Config::from_vars(&vars),
        Err(ConfigError::MissingClientSecret { .. })
    ));

    let directory = InMemoryClientDirectory::new();
    let result = seed_clients(
        &directory,
        &[TestClientBuilder::confidential(TEST_CLIENT_SERVICE).registration(None)],
    )
    .await;

    assert!(matches!(
        result,
        Err(ConfigError::MissingClientSecret { client_id, var })
            if client_id == TEST_CLIENT_SERVICE && var == "AS_CLIENT_SECRET_SERVICE_CLIENT"
    ));
    assert!(directory.is_empty().await);
}
