//! Collaborators the core reads from.
//!
//! The identity store and client directory live outside this crate; they are
//! reached through the traits defined here.

pub mod clients;
pub mod identity;
pub mod scopes;

pub use clients::{ClientDirectory, InMemoryClientDirectory, UpsertOutcome};
pub use identity::IdentityProvider;
pub use scopes::{ConfiguredScopeMap, ScopeResourceMap};
