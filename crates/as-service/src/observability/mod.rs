//! Observability for the authorization-server core.
//!
//! # Privacy by Default
//!
//! Log fields fall into three groups:
//! - **SAFE**: plaintext (scope names, roles, rejection reasons, client ids)
//! - **HASHED**: SHA-256 hashed for correlation (subject identifiers)
//! - **NEVER**: must never appear in logs (client secrets, email addresses)
//!
//! Client ids are public registration data and are logged as-is. Subject
//! identifiers link log lines to a person and are always hashed.

pub mod metrics;

use crate::errors::AsError;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::warn;

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// One-way and truncated: enough to correlate entries for the same subject,
/// not meant to protect secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.iter().take(4).copied().collect::<Vec<u8>>())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller handed in a principal that breaks its contract
    Caller,
    /// Identity store or client directory failed
    Dependency,
    /// Request abandoned by the caller
    Cancelled,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Caller => "caller",
            ErrorCategory::Dependency => "dependency",
            ErrorCategory::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&AsError> for ErrorCategory {
    fn from(err: &AsError) -> Self {
        match err {
            AsError::InvalidPrincipal(_) => ErrorCategory::Caller,
            AsError::Dependency(_) => ErrorCategory::Dependency,
            AsError::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Log and count an error about to be returned from `operation`.
pub(crate) fn record_failure(operation: &'static str, err: &AsError) {
    let category = ErrorCategory::from(err);
    warn!(
        target: "as.services",
        operation = operation,
        error_category = %category,
        error_code = err.code(),
        "Operation failed"
    );
    self::metrics::record_error(operation, category.as_str());
}
