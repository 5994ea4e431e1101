//! Authorization Server (AS) core library
//!
//! Claims issuance and end-session redirect validation for the OpenID Connect
//! authorization server. HTTP endpoints call into this crate; token signing,
//! password storage and routing live elsewhere.
//!
//! # Modules
//!
//! - `claims` - Claim vocabulary, destinations and the assembled claim set
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `models` - Principal, registered clients, redirect decisions
//! - `observability` - Metrics and log-field hashing
//! - `repositories` - Collaborator traits (identity provider, client directory, scope map)
//! - `services` - Authorize flow, claims assembly, logout redirect validation, client seeding

pub mod claims;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
