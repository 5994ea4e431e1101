//! Fixed test IDs for deterministic tests
//!
//! Using fixed values prevents flaky tests caused by random data.

use uuid::Uuid;

// User IDs (100-199)
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(101);

// Client IDs
pub const TEST_CLIENT_WEB_MVC: &str = "web-mvc";
pub const TEST_CLIENT_BLAZOR_WASM: &str = "blazor-wasm";
pub const TEST_CLIENT_SERVICE: &str = "service-client";

// Post-logout redirect URIs
pub const TEST_APP_DONE_URI: &str = "https://app.example/done";
pub const TEST_MVC_SIGNOUT_URI: &str = "https://localhost:7003/signout-callback-oidc";
pub const TEST_WASM_SIGNOUT_URI: &str = "https://localhost:7002/authentication/logout-callback";

// Test secrets (for registration)
pub const TEST_CLIENT_SECRET: &str = "test-secret-do-not-use-in-production";

// API scopes and their resources
pub const SCOPE_BANKING_API: &str = "banking_api";
pub const RESOURCE_BANKING_API: &str = "banking-api";
pub const SCOPE_CAR_RENTAL_API: &str = "car_rental_api";
pub const RESOURCE_CAR_RENTAL_API: &str = "car-rental-api";
