//! # AS Test Utilities
//!
//! Shared test utilities for the authorization-server core.
//!
//! This crate provides:
//! - Fixed test IDs (UUIDs, client ids, URIs, scopes)
//! - Test data builders (`TestPrincipalBuilder`, `TestClientBuilder`)
//! - In-memory fakes for the identity provider and client directory
//! - Custom assertions (`ClaimSetAssertions`, `RedirectDecisionAssertions`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use as_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let principal = TestPrincipalBuilder::new()
//!         .for_user(TEST_USER_ALICE)
//!         .with_admin_rights(2)
//!         .build();
//!
//!     let claims = assemble_user_claims(&principal, &scopes, &test_scope_map());
//!
//!     claims
//!         .assert_claim(ClaimType::Role, "Employee")
//!         .assert_access_token_only(ClaimType::AdminRights);
//! }
//! ```

pub mod assertions;
pub mod builders;
pub mod fakes;
pub mod test_ids;

// Re-export commonly used items
pub use assertions::*;
pub use builders::*;
pub use fakes::*;
pub use test_ids::*;
