//! Requested OAuth scopes.

use std::collections::BTreeSet;

/// OIDC scope that marks an OpenID Connect request. Never an API scope.
pub const OPENID_SCOPE: &str = "openid";

/// OIDC scope that releases profile claims. Never an API scope.
pub const PROFILE_SCOPE: &str = "profile";

/// Returns true for scopes defined by OIDC itself rather than by an API.
pub fn is_identity_scope(scope: &str) -> bool {
    scope == OPENID_SCOPE || scope == PROFILE_SCOPE
}

/// Deduplicated, order-irrelevant set of requested scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: BTreeSet<String>,
}

impl ScopeSet {
    /// Parse the space-delimited OAuth `scope` parameter.
    ///
    /// Repeated and surrounding whitespace is ignored; duplicates collapse.
    pub fn from_scope_param(param: &str) -> Self {
        param.split_whitespace().collect()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Whether profile claims (e.g. `preferred_username`) may be released.
    pub fn includes_profile(&self) -> bool {
        self.contains(PROFILE_SCOPE)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Scopes in a stable (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Scopes that are not OIDC identity scopes and so may name an API.
    pub fn api_scopes(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|s| !is_identity_scope(s))
    }

    /// Render back to the space-delimited wire form.
    pub fn to_scope_param(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            scopes: iter
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }
}
