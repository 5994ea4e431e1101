//! Builder patterns for test data construction

use crate::test_ids::*;
use as_service::errors::AsError;
use as_service::models::{AdminRights, ClientRegistration, ClientType, Principal, RegisteredClient};
use as_service::repositories::ConfiguredScopeMap;
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::secret::SecretString;
use common::types::{ClientId, SubjectId};
use std::collections::BTreeSet;
use uuid::Uuid;

enum TestSubject {
    User(Uuid),
    Raw(String),
}

/// Builder for test principals
///
/// # Example
/// ```rust,ignore
/// let principal = TestPrincipalBuilder::new()
///     .for_user(TEST_USER_BOB)
///     .with_username("bob")
///     .with_admin_rights(0b11)
///     .build();
/// ```
pub struct TestPrincipalBuilder {
    subject: TestSubject,
    email: Option<String>,
    username: Option<String>,
    admin_rights: u32,
    timestamps: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TestPrincipalBuilder {
    /// Alice, with email and username, no admin rights, no timestamps
    pub fn new() -> Self {
        Self {
            subject: TestSubject::User(TEST_USER_ALICE),
            email: Some("alice@bank.example".to_string()),
            username: Some("alice".to_string()),
            admin_rights: 0,
            timestamps: None,
        }
    }

    pub fn for_user(mut self, id: Uuid) -> Self {
        self.subject = TestSubject::User(id);
        self
    }

    /// Set a raw subject string (may be blank, for negative tests)
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = TestSubject::Raw(subject.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn without_username(mut self) -> Self {
        self.username = None;
        self
    }

    pub fn with_admin_rights(mut self, bits: u32) -> Self {
        self.admin_rights = bits;
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.timestamps = Some((created_at, updated_at));
        self
    }

    /// Fixed creation time with an update `days_later`
    pub fn created_days_before_update(self, days_later: i64) -> Self {
        let created = test_instant();
        self.with_timestamps(created, created + Duration::days(days_later))
    }

    /// Build, surfacing constructor errors
    pub fn try_build(self) -> Result<Principal, AsError> {
        let subject = match self.subject {
            TestSubject::User(id) => SubjectId::from_uuid(id),
            TestSubject::Raw(raw) => SubjectId::new(raw)?,
        };
        let mut principal =
            Principal::new(subject).with_admin_rights(AdminRights::from_bits(self.admin_rights));
        if let Some(email) = self.email {
            principal = principal.with_email(email);
        }
        if let Some(username) = self.username {
            principal = principal.with_username(username);
        }
        if let Some((created_at, updated_at)) = self.timestamps {
            principal = principal.with_timestamps(created_at, updated_at)?;
        }
        Ok(principal)
    }

    /// Build, panicking on invalid input
    pub fn build(self) -> Principal {
        self.try_build().expect("TestPrincipalBuilder produced an invalid principal")
    }
}

impl Default for TestPrincipalBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed instant used as the creation time of test principals
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0)
        .single()
        .expect("fixed test instant is valid")
}

/// Builder for registered clients
///
/// # Example
/// ```rust,ignore
/// let client = TestClientBuilder::confidential(TEST_CLIENT_WEB_MVC)
///     .with_post_logout_uri(TEST_MVC_SIGNOUT_URI)
///     .build();
/// ```
pub struct TestClientBuilder {
    client_id: String,
    display_name: String,
    client_type: ClientType,
    redirect_uris: BTreeSet<String>,
    post_logout_redirect_uris: BTreeSet<String>,
}

impl TestClientBuilder {
    pub fn public(client_id: &str) -> Self {
        Self::new(client_id, ClientType::Public)
    }

    pub fn confidential(client_id: &str) -> Self {
        Self::new(client_id, ClientType::Confidential)
    }

    fn new(client_id: &str, client_type: ClientType) -> Self {
        Self {
            client_id: client_id.to_string(),
            display_name: format!("Test client {}", client_id),
            client_type,
            redirect_uris: BTreeSet::new(),
            post_logout_redirect_uris: BTreeSet::new(),
        }
    }

    pub fn with_redirect_uri(mut self, uri: &str) -> Self {
        self.redirect_uris.insert(uri.to_string());
        self
    }

    pub fn with_post_logout_uri(mut self, uri: &str) -> Self {
        self.post_logout_redirect_uris.insert(uri.to_string());
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn build(self) -> RegisteredClient {
        RegisteredClient {
            client_id: ClientId::new(self.client_id).expect("test client id must not be blank"),
            display_name: self.display_name,
            requires_pkce: self.client_type == ClientType::Public,
            client_type: self.client_type,
            redirect_uris: self.redirect_uris,
            post_logout_redirect_uris: self.post_logout_redirect_uris,
        }
    }

    /// Registration as loaded from configuration
    pub fn registration(self, secret: Option<&str>) -> ClientRegistration {
        ClientRegistration {
            client: self.build(),
            secret: secret.map(SecretString::from),
        }
    }
}

/// Scope map with the banking and car-rental APIs
pub fn test_scope_map() -> ConfiguredScopeMap {
    ConfiguredScopeMap::new([
        (SCOPE_BANKING_API, RESOURCE_BANKING_API),
        (SCOPE_CAR_RENTAL_API, RESOURCE_CAR_RENTAL_API),
    ])
}

/// `count` public clients `client-000`, `client-001`, ... each registering
/// `https://client-NNN.example/signed-out`
pub fn numbered_clients(count: usize) -> Vec<RegisteredClient> {
    (0..count)
        .map(|i| {
            let id = format!("client-{:03}", i);
            let uri = format!("https://{}.example/signed-out", id);
            TestClientBuilder::public(&id)
                .with_post_logout_uri(&uri)
                .build()
        })
        .collect()
}
