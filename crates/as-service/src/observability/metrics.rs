//! Metrics for the authorization-server core.
//!
//! Naming follows Prometheus conventions:
//! - `as_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `flow`: user, service
//! - `outcome`: accepted, rejected, fallback
//! - `reason`: one value per `RejectionReason`, plus `none`
//! - `operation`: find, list, upsert (directory); authorize, logout_redirect (errors)
//! - `status`: success, error
//! - `error_category`: caller, dependency, cancelled

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Claims Metrics
// ============================================================================

/// Record an assembled claim set
///
/// Metric: `as_claims_issued_total`
/// Labels: `flow`
pub fn record_claims_issued(flow: &str) {
    counter!("as_claims_issued_total", "flow" => flow.to_string()).increment(1);
}

/// Record a requested scope that maps to no known API resource
///
/// Metric: `as_unknown_scopes_total`
///
/// The scope itself is not a label: callers control it.
pub fn record_unknown_scope() {
    counter!("as_unknown_scopes_total").increment(1);
}

// ============================================================================
// Logout Redirect Metrics
// ============================================================================

/// Record a post-logout redirect decision
///
/// Metric: `as_logout_redirect_decisions_total`
/// Labels: `outcome`, `reason`
pub fn record_redirect_decision(outcome: &str, reason: &str) {
    counter!("as_logout_redirect_decisions_total",
        "outcome" => outcome.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Directory Metrics
// ============================================================================

/// Record a client directory call
///
/// Metric: `as_directory_query_duration_seconds`, `as_directory_queries_total`
/// Labels: `operation`, `status`
pub fn record_directory_query(operation: &str, status: &str, duration: Duration) {
    histogram!("as_directory_query_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("as_directory_queries_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record an error returned to the caller
///
/// Metric: `as_errors_total`
/// Labels: `operation`, `error_category`
pub fn record_error(operation: &str, error_category: &str) {
    counter!("as_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string()
    )
    .increment(1);
}
