//! Claim vocabulary and per-token routing.
//!
//! Claims never land in a token implicitly. Every claim type has an explicit
//! destination rule: the ID token is read by clients and UIs, the access token
//! by APIs. Elevated-rights data (`admin_rights`, `account_type`) is access
//! token only. A claim type without a rule reaches no token at all.
//!
//! The claim type strings are the wire contract with downstream APIs and must
//! not change.

pub mod scopes;

pub use scopes::{ScopeSet, OPENID_SCOPE, PROFILE_SCOPE};

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Closed vocabulary of claim types issued by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClaimType {
    Subject,
    Email,
    PreferredUsername,
    Role,
    AccountType,
    AdminRights,
    CreatedAt,
    UpdatedAt,
}

impl ClaimType {
    pub const ALL: [ClaimType; 8] = [
        ClaimType::Subject,
        ClaimType::Email,
        ClaimType::PreferredUsername,
        ClaimType::Role,
        ClaimType::AccountType,
        ClaimType::AdminRights,
        ClaimType::CreatedAt,
        ClaimType::UpdatedAt,
    ];

    /// Wire name of the claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Subject => "sub",
            ClaimType::Email => "email",
            ClaimType::PreferredUsername => "preferred_username",
            ClaimType::Role => "role",
            ClaimType::AccountType => "account_type",
            ClaimType::AdminRights => "admin_rights",
            ClaimType::CreatedAt => "created_at",
            ClaimType::UpdatedAt => "updated_at",
        }
    }

    /// Look up a claim type by wire name. Exact, case-sensitive match.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issued token types a claim can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    IdentityToken,
    AccessToken,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::IdentityToken => "id_token",
            TokenType::AccessToken => "access_token",
        }
    }
}

/// The set of token types a claim may appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenDestinations {
    identity_token: bool,
    access_token: bool,
}

impl TokenDestinations {
    pub const NONE: Self = Self {
        identity_token: false,
        access_token: false,
    };

    pub const ACCESS_TOKEN_ONLY: Self = Self {
        identity_token: false,
        access_token: true,
    };

    pub const BOTH: Self = Self {
        identity_token: true,
        access_token: true,
    };

    pub fn contains(&self, token: TokenType) -> bool {
        match token {
            TokenType::IdentityToken => self.identity_token,
            TokenType::AccessToken => self.access_token,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.identity_token && !self.access_token
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenType> + '_ {
        [TokenType::IdentityToken, TokenType::AccessToken]
            .into_iter()
            .filter(move |t| self.contains(*t))
    }
}

impl fmt::Display for TokenDestinations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<none>");
        }
        let names: Vec<&str> = self.iter().map(|t| t.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

/// Destination rule for a claim type.
///
/// Total over the vocabulary. `preferred_username` is released only when the
/// `profile` scope was requested.
pub fn destinations(claim_type: ClaimType, scopes: &ScopeSet) -> TokenDestinations {
    match claim_type {
        ClaimType::Subject | ClaimType::Role | ClaimType::CreatedAt | ClaimType::UpdatedAt => {
            TokenDestinations::BOTH
        }
        ClaimType::PreferredUsername => {
            if scopes.includes_profile() {
                TokenDestinations::BOTH
            } else {
                TokenDestinations::NONE
            }
        }
        ClaimType::AccountType | ClaimType::AdminRights => TokenDestinations::ACCESS_TOKEN_ONLY,
        ClaimType::Email => TokenDestinations::NONE,
    }
}

/// Destination rule for a claim type given by wire name.
///
/// Unrecognized names route nowhere.
pub fn destinations_for(claim_type: &str, scopes: &ScopeSet) -> TokenDestinations {
    ClaimType::from_wire(claim_type)
        .map_or(TokenDestinations::NONE, |t| destinations(t, scopes))
}

/// A single claim with its routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    claim_type: ClaimType,
    value: String,
    destinations: TokenDestinations,
}

impl Claim {
    pub fn claim_type(&self) -> ClaimType {
        self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn destinations(&self) -> TokenDestinations {
        self.destinations
    }
}

/// How destinations are computed when a claim set is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Apply [`destinations`] per claim type.
    PerClaimType,
    /// Every claim goes to the access token only (service clients have no ID token).
    AccessTokenOnly,
}

/// Collects claim values before routing is applied.
///
/// Each claim type holds at most one value; a second value for the same type
/// is ignored.
#[derive(Debug, Default)]
pub struct ClaimSetBuilder {
    values: BTreeMap<ClaimType, String>,
}

impl ClaimSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(mut self, claim_type: ClaimType, value: impl Into<String>) -> Self {
        self.values.entry(claim_type).or_insert_with(|| value.into());
        self
    }

    /// Set the claim only if `value` is present and not blank.
    pub fn optional_claim(self, claim_type: ClaimType, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.claim(claim_type, v),
            _ => self,
        }
    }

    pub fn build(self, scopes: ScopeSet, resources: Vec<String>, routing: Routing) -> ClaimSet {
        let claims = self
            .values
            .into_iter()
            .map(|(claim_type, value)| {
                let destinations = match routing {
                    Routing::PerClaimType => destinations(claim_type, &scopes),
                    Routing::AccessTokenOnly => TokenDestinations::ACCESS_TOKEN_ONLY,
                };
                (
                    claim_type,
                    Claim {
                        claim_type,
                        value,
                        destinations,
                    },
                )
            })
            .collect();

        ClaimSet {
            claims,
            scopes,
            resources,
        }
    }
}

/// Immutable claims for one token-issuance request, keyed by claim type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    claims: BTreeMap<ClaimType, Claim>,
    scopes: ScopeSet,
    resources: Vec<String>,
}

impl ClaimSet {
    pub fn get(&self, claim_type: ClaimType) -> Option<&Claim> {
        self.claims.get(&claim_type)
    }

    pub fn value(&self, claim_type: ClaimType) -> Option<&str> {
        self.get(claim_type).map(Claim::value)
    }

    /// Value of the claim only if it is routed to `token`.
    pub fn value_in(&self, claim_type: ClaimType, token: TokenType) -> Option<&str> {
        self.get(claim_type)
            .filter(|c| c.destinations.contains(token))
            .map(Claim::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.values()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Claims routed to the given token type.
    pub fn for_token(&self, token: TokenType) -> impl Iterator<Item = &Claim> {
        self.iter().filter(move |c| c.destinations.contains(token))
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// API resources (audiences) resolved from the requested scopes.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// JSON payload for the external token encoder.
    ///
    /// Contains the claims routed to `token`. Access tokens additionally carry
    /// `scope` and, when any API resource was resolved, `aud`.
    pub fn token_payload(&self, token: TokenType) -> Map<String, Value> {
        let mut payload: Map<String, Value> = self
            .for_token(token)
            .map(|c| (c.claim_type.as_str().to_string(), Value::from(c.value.clone())))
            .collect();

        if token == TokenType::AccessToken {
            payload.insert("scope".to_string(), Value::from(self.scopes.to_scope_param()));
            if !self.resources.is_empty() {
                payload.insert("aud".to_string(), Value::from(self.resources.clone()));
            }
        }

        payload
    }
}
