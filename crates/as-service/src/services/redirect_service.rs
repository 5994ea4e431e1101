//! Post-logout redirect validation.
//!
//! The end-session endpoint receives a `post_logout_redirect_uri` chosen by
//! whoever built the link. It is only followed when it matches a URI some
//! registered client declared; otherwise the user lands on the fallback.
//! The decision never carries the caller's string: an accepted decision holds
//! the registered URI that matched.

use crate::config::DEFAULT_DIRECTORY_PAGE_SIZE;
use crate::errors::AsError;
use crate::models::{RedirectDecision, RegisteredClient, RejectionReason};
use crate::observability::metrics::record_redirect_decision;
use crate::observability::record_failure;
use crate::repositories::clients::{enumerate_clients, find_registered_client};
use crate::repositories::ClientDirectory;
use common::types::ClientId;
use futures::TryStreamExt;
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// How a requested URI is compared with a registered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UriMatching {
    /// Scheme, host, port and path; query and fragment ignored.
    #[default]
    Lenient,
    /// As lenient, plus exact query and fragment.
    Strict,
}

impl UriMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            UriMatching::Lenient => "lenient",
            UriMatching::Strict => "strict",
        }
    }
}

impl fmt::Display for UriMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UriMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(UriMatching::Lenient),
            "strict" => Ok(UriMatching::Strict),
            _ => Err(format!("Invalid URI matching mode: {}", s)),
        }
    }
}

/// Validator settings, loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    pub matching: UriMatching,
    /// Match against every registered client when no client id is given.
    pub allow_directory_scan: bool,
    /// Clients fetched per directory page while scanning.
    pub page_size: usize,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            matching: UriMatching::Lenient,
            allow_directory_scan: true,
            page_size: DEFAULT_DIRECTORY_PAGE_SIZE,
        }
    }
}

/// Compare two absolute URIs under the given matching mode.
///
/// Scheme, host and path compare case-insensitively, with one trailing slash
/// stripped from the path. Ports compare after applying the scheme default,
/// so `https://a.example:443/x` equals `https://a.example/x`.
pub fn canonical_eq(requested: &Url, registered: &Url, matching: UriMatching) -> bool {
    let same_origin = requested.scheme().eq_ignore_ascii_case(registered.scheme())
        && host_key(requested) == host_key(registered)
        && requested.port_or_known_default() == registered.port_or_known_default();

    if !same_origin || path_key(requested) != path_key(registered) {
        return false;
    }

    match matching {
        UriMatching::Lenient => true,
        UriMatching::Strict => {
            requested.query().unwrap_or("") == registered.query().unwrap_or("")
                && requested.fragment().unwrap_or("") == registered.fragment().unwrap_or("")
        }
    }
}

fn host_key(url: &Url) -> Option<String> {
    url.host_str().map(str::to_ascii_lowercase)
}

fn path_key(url: &Url) -> String {
    let path = url.path();
    path.strip_suffix('/').unwrap_or(path).to_ascii_lowercase()
}

/// First registered post-logout URI of `client` matching `requested`.
///
/// Registered entries that do not parse as absolute URIs are skipped.
fn matching_uri<'c>(
    client: &'c RegisteredClient,
    requested: &Url,
    matching: UriMatching,
) -> Option<&'c str> {
    client
        .post_logout_redirect_uris
        .iter()
        .find(|registered| {
            Url::parse(registered).is_ok_and(|r| canonical_eq(requested, &r, matching))
        })
        .map(String::as_str)
}

enum Lookup {
    Matched { client_id: ClientId, uri: String },
    Rejected(RejectionReason),
}

/// Decide where to send the user after logout.
///
/// A blank `client_id` is treated as absent. Rejections are not errors: they
/// come back as a fallback decision with a [`RejectionReason`]. Errors are
/// directory failures (`Dependency`) and cancellation (`Cancelled`).
pub async fn validate_logout_redirect(
    directory: &dyn ClientDirectory,
    policy: &RedirectPolicy,
    requested_uri: Option<&str>,
    client_id: Option<&str>,
    cancel: &CancellationToken,
) -> Result<RedirectDecision, AsError> {
    let Some(requested) = requested_uri.map(str::trim).filter(|s| !s.is_empty()) else {
        debug!(target: "as.services.redirect", "No post-logout redirect requested");
        record_redirect_decision("fallback", "none");
        return Ok(RedirectDecision::not_requested());
    };
    let client_id = client_id.map(str::trim).filter(|s| !s.is_empty());

    let Ok(requested_url) = Url::parse(requested) else {
        return Ok(reject(requested, client_id, RejectionReason::MalformedUri));
    };

    let lookup = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            debug!(
                target: "as.services.redirect",
                "Post-logout redirect validation cancelled"
            );
            let err = AsError::Cancelled;
            record_failure("logout_redirect", &err);
            return Err(err);
        }
        result = find_match(directory, policy, &requested_url, client_id) => {
            result.inspect_err(|e| record_failure("logout_redirect", e))?
        }
    };

    match lookup {
        Lookup::Matched { client_id, uri } => {
            info!(
                target: "as.services.redirect",
                client_id = %client_id,
                approved_uri = %uri,
                matching = %policy.matching,
                "Post-logout redirect accepted"
            );
            record_redirect_decision("accepted", "none");
            Ok(RedirectDecision::approved(&uri))
        }
        Lookup::Rejected(reason) => Ok(reject(requested, client_id, reason)),
    }
}

async fn find_match(
    directory: &dyn ClientDirectory,
    policy: &RedirectPolicy,
    requested: &Url,
    client_id: Option<&str>,
) -> Result<Lookup, AsError> {
    if let Some(raw_id) = client_id {
        let Ok(id) = ClientId::new(raw_id) else {
            return Ok(Lookup::Rejected(RejectionReason::UnknownClient));
        };
        let Some(client) = find_registered_client(directory, &id).await? else {
            return Ok(Lookup::Rejected(RejectionReason::UnknownClient));
        };

        return Ok(match matching_uri(&client, requested, policy.matching) {
            Some(uri) => Lookup::Matched {
                uri: uri.to_string(),
                client_id: client.client_id.clone(),
            },
            None => Lookup::Rejected(RejectionReason::UnregisteredUri),
        });
    }

    if !policy.allow_directory_scan {
        return Ok(Lookup::Rejected(RejectionReason::ClientIdRequired));
    }

    warn!(
        target: "as.security",
        page_size = policy.page_size,
        "Logout request without client_id, matching against all registered clients (reduced security)"
    );

    let mut clients = std::pin::pin!(enumerate_clients(directory, policy.page_size));
    while let Some(client) = clients.try_next().await? {
        if let Some(uri) = matching_uri(&client, requested, policy.matching) {
            return Ok(Lookup::Matched {
                uri: uri.to_string(),
                client_id: client.client_id.clone(),
            });
        }
    }

    Ok(Lookup::Rejected(RejectionReason::UnregisteredUri))
}

fn reject(requested: &str, client_id: Option<&str>, reason: RejectionReason) -> RedirectDecision {
    warn!(
        target: "as.security",
        requested_uri = %requested,
        client_id = client_id.unwrap_or("<none>"),
        reason = reason.as_str(),
        "Post-logout redirect rejected, using fallback"
    );
    record_redirect_decision("rejected", reason.as_str());
    RedirectDecision::rejected(reason)
}
