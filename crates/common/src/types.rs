//! Identifier types shared by the authorization-server crates.
//!
//! Both identifiers are opaque strings that must never be empty. Emptiness is
//! rejected at construction, so holders of a [`SubjectId`] or [`ClientId`]
//! never need to re-check it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when an identifier is constructed from a blank string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} must not be empty")]
pub struct EmptyIdentifier {
    /// Which identifier was being constructed
    pub kind: &'static str,
}

/// Stable, opaque per-user identifier (the OIDC `sub` claim).
///
/// Issued once by the identity store and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject identifier, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyIdentifier`] if `value` is empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyIdentifier> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyIdentifier { kind: "subject" });
        }
        Ok(Self(value))
    }

    /// Subject identifier for a store that keys users by UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = EmptyIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// OAuth 2.0 client identifier, unique within the client directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Create a client identifier, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyIdentifier`] if `value` is empty or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyIdentifier> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmptyIdentifier { kind: "client_id" });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = EmptyIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
