use crate::claims::{ClaimSet, ClaimType, TokenType};
use crate::errors::AsError;
use chrono::{DateTime, Utc};
use common::secret::SecretString;
use common::types::{ClientId, SubjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Redirect target used whenever a requested post-logout URI is not approved.
pub const SAFE_FALLBACK_URI: &str = "/";

/// Admin-rights bitmask. Each set bit is one elevated capability; 0 means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminRights(u32);

impl AdminRights {
    pub const NONE: Self = Self(0);

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_elevated(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for AdminRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Domain role of a banking user, derived from admin rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainRole {
    Owner,
    Employee,
}

impl DomainRole {
    /// Anyone holding an elevated right is staff; everyone else owns accounts.
    pub fn from_admin_rights(rights: AdminRights) -> Self {
        if rights.is_elevated() {
            DomainRole::Employee
        } else {
            DomainRole::Owner
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainRole::Owner => "Owner",
            DomainRole::Employee => "Employee",
        }
    }
}

impl fmt::Display for DomainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity as read from the identity store.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    subject: SubjectId,
    email: Option<String>,
    username: Option<String>,
    admin_rights: AdminRights,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            email: None,
            username: None,
            admin_rights: AdminRights::NONE,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_admin_rights(mut self, admin_rights: AdminRights) -> Self {
        self.admin_rights = admin_rights;
        self
    }

    /// Attach lifecycle timestamps.
    ///
    /// # Errors
    ///
    /// `InvalidPrincipal` if `updated_at` precedes `created_at`.
    pub fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, AsError> {
        if updated_at < created_at {
            return Err(AsError::InvalidPrincipal(format!(
                "updated_at ({}) precedes created_at ({})",
                updated_at.to_rfc3339(),
                created_at.to_rfc3339()
            )));
        }
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        Ok(self)
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn admin_rights(&self) -> AdminRights {
        self.admin_rights
    }

    pub fn role(&self) -> DomainRole {
        DomainRole::from_admin_rights(self.admin_rights)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Custom Debug implementation that redacts personal identifiers.
///
/// Principals pass through tracing spans; subject and email must not be
/// written to logs in plaintext.
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("subject", &"[REDACTED]")
            .field("email", &self.email.as_ref().map(|_| "[REDACTED]"))
            .field("username", &self.username)
            .field("admin_rights", &self.admin_rights)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// OAuth client type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    /// Cannot keep a secret (SPA, mobile app); uses PKCE.
    Public,
    /// Authenticates with a client secret.
    Confidential,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Public => "public",
            ClientType::Confidential => "confidential",
        }
    }
}

impl FromStr for ClientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(ClientType::Public),
            "confidential" => Ok(ClientType::Confidential),
            _ => Err(format!("Invalid client type: {}", s)),
        }
    }
}

/// Registered client as held by the client directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredClient {
    pub client_id: ClientId,
    pub display_name: String,
    pub client_type: ClientType,
    pub redirect_uris: BTreeSet<String>,
    pub post_logout_redirect_uris: BTreeSet<String>,
    pub requires_pkce: bool,
}

impl RegisteredClient {
    /// Confidential clients must present a secret at the token endpoint.
    pub fn requires_secret(&self) -> bool {
        self.client_type == ClientType::Confidential
    }
}

/// A client as loaded from configuration, before it is seeded into the
/// directory. `secret` is set for confidential clients only.
#[derive(Debug, Clone)]
pub struct ClientRegistration {
    pub client: RegisteredClient,
    pub secret: Option<SecretString>,
}

/// Why a requested post-logout redirect was not approved.
///
/// Internal only: end users are always sent to the fallback without detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Not an absolute URI.
    MalformedUri,
    /// A client id was supplied but the directory does not know it.
    UnknownClient,
    /// No registered post-logout URI matched.
    UnregisteredUri,
    /// No client id was supplied and directory-wide matching is disabled.
    ClientIdRequired,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MalformedUri => "malformed_uri",
            RejectionReason::UnknownClient => "unknown_client",
            RejectionReason::UnregisteredUri => "unregistered_uri",
            RejectionReason::ClientIdRequired => "client_id_required",
        }
    }
}

/// Outcome of post-logout redirect validation.
///
/// `approved_uri` is either [`SAFE_FALLBACK_URI`] or a URI taken from a
/// registered client's post-logout set; it is never the caller's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    approved_uri: String,
    accepted: bool,
    rejection: Option<RejectionReason>,
}

impl RedirectDecision {
    /// Nothing was requested; send the user to the fallback.
    pub(crate) fn not_requested() -> Self {
        Self {
            approved_uri: SAFE_FALLBACK_URI.to_string(),
            accepted: false,
            rejection: None,
        }
    }

    pub(crate) fn rejected(reason: RejectionReason) -> Self {
        Self {
            approved_uri: SAFE_FALLBACK_URI.to_string(),
            accepted: false,
            rejection: Some(reason),
        }
    }

    pub(crate) fn approved(registered_uri: &str) -> Self {
        Self {
            approved_uri: registered_uri.to_string(),
            accepted: true,
            rejection: None,
        }
    }

    pub fn approved_uri(&self) -> &str {
        &self.approved_uri
    }

    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn rejection(&self) -> Option<RejectionReason> {
        self.rejection
    }
}

/// UserInfo response (OIDC Core 5.3)
///
/// Built from the claims an access token carries, so claims routed nowhere
/// (or to the ID token only) are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_rights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserInfo {
    /// Project an assembled claim set. Returns `None` without a subject.
    pub fn from_claims(claims: &ClaimSet) -> Option<Self> {
        let in_access_token =
            |t: ClaimType| claims.value_in(t, TokenType::AccessToken).map(str::to_string);

        Some(UserInfo {
            sub: in_access_token(ClaimType::Subject)?,
            preferred_username: in_access_token(ClaimType::PreferredUsername),
            email: in_access_token(ClaimType::Email),
            role: in_access_token(ClaimType::Role),
            admin_rights: in_access_token(ClaimType::AdminRights),
            created_at: in_access_token(ClaimType::CreatedAt),
            updated_at: in_access_token(ClaimType::UpdatedAt),
        })
    }
}
