use crate::models::{ClientRegistration, ClientType, RegisteredClient};
use crate::services::redirect_service::{RedirectPolicy, UriMatching};
use common::secret::SecretString;
use common::types::ClientId;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;
use thiserror::Error;
use url::Url;

/// Default number of clients fetched per directory page during a scan.
pub const DEFAULT_DIRECTORY_PAGE_SIZE: usize = 100;

/// Prefix of the per-client secret variables.
pub const CLIENT_SECRET_VAR_PREFIX: &str = "AS_CLIENT_SECRET_";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: ServerEndpoints,
    pub apis: BTreeMap<String, ApiDefinition>,
    pub clients: Vec<ClientRegistration>,
    pub redirect_policy: RedirectPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Invalid JSON in {var}: {source}")]
    InvalidJson {
        var: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API definition: {0}")]
    InvalidApi(String),

    #[error("Invalid client registration: {0}")]
    InvalidClient(String),

    #[error("Confidential client '{client_id}' has no secret (set {var})")]
    MissingClientSecret { client_id: String, var: String },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Invalid redirect matching mode: {0}")]
    InvalidMatching(String),

    #[error("Invalid boolean for {var}: {value}")]
    InvalidBool { var: String, value: String },
}

/// An API protected by this server: the scope clients request and the
/// resource (audience) identifier placed in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiDefinition {
    pub scope: String,
    pub resource: String,
}

/// Client entry as written in `AS_CLIENTS`.
#[derive(Debug, Deserialize)]
struct ClientEntry {
    client_id: String,
    display_name: String,
    client_type: ClientType,
    #[serde(default)]
    redirect_uris: Vec<String>,
    #[serde(default)]
    post_logout_redirect_uris: Vec<String>,
    /// Defaults to true for public clients, false for confidential ones.
    #[serde(default)]
    requires_pkce: Option<bool>,
}

/// Protocol endpoints, all relative to the issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoints {
    pub issuer: Url,
    pub configuration: Url,
    pub authorization: Url,
    pub token: Url,
    pub userinfo: Url,
    pub end_session: Url,
}

impl ServerEndpoints {
    pub const CONFIGURATION_PATH: &'static str = ".well-known/openid-configuration";
    pub const AUTHORIZATION_PATH: &'static str = "connect/authorize";
    pub const TOKEN_PATH: &'static str = "connect/token";
    pub const USERINFO_PATH: &'static str = "connect/userinfo";
    pub const END_SESSION_PATH: &'static str = "connect/endsession";

    /// Derive the endpoints from the issuer URI.
    ///
    /// A trailing slash is added to the issuer if missing, so paths resolve
    /// below it rather than replacing its last segment.
    pub fn from_issuer(issuer: &str) -> Result<Self, ConfigError> {
        let issuer = ensure_trailing_slash(issuer.trim());
        let issuer = Url::parse(&issuer)
            .map_err(|e| ConfigError::InvalidUri(format!("AS_ISSUER_URI '{}': {}", issuer, e)))?;

        if !matches!(issuer.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUri(format!(
                "AS_ISSUER_URI must be http or https, got '{}'",
                issuer.scheme()
            )));
        }
        if issuer.query().is_some() || issuer.fragment().is_some() {
            return Err(ConfigError::InvalidUri(
                "AS_ISSUER_URI must not have a query or fragment".to_string(),
            ));
        }

        let join = |path: &str| {
            issuer
                .join(path)
                .map_err(|e| ConfigError::InvalidUri(format!("{}: {}", path, e)))
        };

        Ok(ServerEndpoints {
            configuration: join(Self::CONFIGURATION_PATH)?,
            authorization: join(Self::AUTHORIZATION_PATH)?,
            token: join(Self::TOKEN_PATH)?,
            userinfo: join(Self::USERINFO_PATH)?,
            end_session: join(Self::END_SESSION_PATH)?,
            issuer,
        })
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Name of the variable holding a client's secret.
///
/// `web-mvc` → `AS_CLIENT_SECRET_WEB_MVC`
pub fn client_secret_var(client_id: &str) -> String {
    let suffix: String = client_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", CLIENT_SECRET_VAR_PREFIX, suffix)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let issuer = vars
            .get("AS_ISSUER_URI")
            .ok_or_else(|| ConfigError::MissingEnvVar("AS_ISSUER_URI".to_string()))?;
        let endpoints = ServerEndpoints::from_issuer(issuer)?;

        let apis: BTreeMap<String, ApiDefinition> = match vars.get("AS_APIS") {
            Some(raw) => parse_json("AS_APIS", raw)?,
            None => BTreeMap::new(),
        };
        for (name, api) in &apis {
            if api.scope.trim().is_empty() || api.resource.trim().is_empty() {
                return Err(ConfigError::InvalidApi(format!(
                    "API '{}' needs a non-empty scope and resource",
                    name
                )));
            }
        }

        let entries: Vec<ClientEntry> = match vars.get("AS_CLIENTS") {
            Some(raw) => parse_json("AS_CLIENTS", raw)?,
            None => Vec::new(),
        };
        let clients = load_clients(entries, vars)?;

        let matching = match vars.get("AS_LOGOUT_REDIRECT_MATCHING") {
            Some(raw) => raw
                .parse::<UriMatching>()
                .map_err(|_| ConfigError::InvalidMatching(raw.clone()))?,
            None => UriMatching::Lenient,
        };

        let allow_directory_scan = match vars.get("AS_LOGOUT_ALLOW_DIRECTORY_SCAN") {
            Some(raw) => parse_bool("AS_LOGOUT_ALLOW_DIRECTORY_SCAN", raw)?,
            None => true,
        };

        let page_size = match vars.get("AS_CLIENT_DIRECTORY_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::InvalidPageSize(
                        "AS_CLIENT_DIRECTORY_PAGE_SIZE must be greater than 0".to_string(),
                    ))
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::InvalidPageSize(format!(
                        "AS_CLIENT_DIRECTORY_PAGE_SIZE '{}': {}",
                        raw, e
                    )))
                }
            },
            None => DEFAULT_DIRECTORY_PAGE_SIZE,
        };

        Ok(Config {
            endpoints,
            apis,
            clients,
            redirect_policy: RedirectPolicy {
                matching,
                allow_directory_scan,
                page_size,
            },
        })
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(var: &str, raw: &str) -> Result<T, ConfigError> {
    serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson {
        var: var.to_string(),
        source,
    })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn load_clients(
    entries: Vec<ClientEntry>,
    vars: &HashMap<String, String>,
) -> Result<Vec<ClientRegistration>, ConfigError> {
    let mut seen = BTreeSet::new();
    let mut registrations = Vec::with_capacity(entries.len());

    for entry in entries {
        let client_id = ClientId::new(entry.client_id.as_str())
            .map_err(|e| ConfigError::InvalidClient(e.to_string()))?;
        if !seen.insert(client_id.clone()) {
            return Err(ConfigError::InvalidClient(format!(
                "duplicate client_id '{}'",
                client_id
            )));
        }

        let redirect_uris = absolute_uris(&client_id, "redirect_uris", entry.redirect_uris)?;
        let post_logout_redirect_uris = absolute_uris(
            &client_id,
            "post_logout_redirect_uris",
            entry.post_logout_redirect_uris,
        )?;

        let secret = match entry.client_type {
            ClientType::Confidential => {
                let var = client_secret_var(client_id.as_str());
                match vars.get(&var) {
                    Some(secret) if !secret.trim().is_empty() => {
                        Some(SecretString::from(secret.clone()))
                    }
                    _ => {
                        return Err(ConfigError::MissingClientSecret {
                            client_id: client_id.to_string(),
                            var,
                        })
                    }
                }
            }
            ClientType::Public => None,
        };

        let requires_pkce = entry
            .requires_pkce
            .unwrap_or(entry.client_type == ClientType::Public);

        registrations.push(ClientRegistration {
            client: RegisteredClient {
                client_id,
                display_name: entry.display_name,
                client_type: entry.client_type,
                redirect_uris,
                post_logout_redirect_uris,
                requires_pkce,
            },
            secret,
        });
    }

    Ok(registrations)
}

fn absolute_uris(
    client_id: &ClientId,
    field: &str,
    uris: Vec<String>,
) -> Result<BTreeSet<String>, ConfigError> {
    uris.into_iter()
        .map(|uri| match Url::parse(&uri) {
            Ok(_) => Ok(uri),
            Err(e) => Err(ConfigError::InvalidUri(format!(
                "client '{}' {} '{}': {}",
                client_id, field, uri, e
            ))),
        })
        .collect()
}
