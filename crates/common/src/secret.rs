//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Confidential OIDC
//! clients carry a client secret from configuration to the client directory;
//! wrapping it in [`SecretString`] keeps it out of `{:?}` output and tracing
//! fields, and zeroizes it on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct ClientSecretEntry {
//!     client_id: String,
//!     client_secret: SecretString,  // Debug shows "[REDACTED]"
//! }
//!
//! let entry = ClientSecretEntry {
//!     client_id: "web-mvc".to_string(),
//!     client_secret: SecretString::from("s3cr3t"),
//! };
//!
//! println!("{:?}", entry);
//!
//! // Reading the value is always explicit
//! let secret: &str = entry.client_secret.expose_secret();
//! ```
//!
//! Use `SecretString` for:
//! - OAuth client secrets
//! - Bearer tokens handed to the external token encoder
//! - Anything read from `*_SECRET` environment variables

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
