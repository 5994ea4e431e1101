use crate::claims::scopes::is_identity_scope;
use crate::config::ApiDefinition;
use std::collections::{BTreeMap, HashMap};

/// Static lookup from an API scope to its resource (audience) identifier.
pub trait ScopeResourceMap: Send + Sync {
    fn resolve_resource(&self, scope: &str) -> Option<String>;
}

/// Scope map built from the configured API definitions.
///
/// Matching is exact and case-sensitive. `openid` and `profile` never
/// resolve, even if an API is misconfigured to use one of them.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredScopeMap {
    resources: HashMap<String, String>,
}

impl ConfiguredScopeMap {
    pub fn new<S, R>(entries: impl IntoIterator<Item = (S, R)>) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        Self {
            resources: entries
                .into_iter()
                .map(|(scope, resource)| (scope.into(), resource.into()))
                .collect(),
        }
    }

    pub fn from_apis(apis: &BTreeMap<String, ApiDefinition>) -> Self {
        Self::new(
            apis.values()
                .map(|api| (api.scope.clone(), api.resource.clone())),
        )
    }
}

impl ScopeResourceMap for ConfiguredScopeMap {
    fn resolve_resource(&self, scope: &str) -> Option<String> {
        if is_identity_scope(scope) {
            return None;
        }
        self.resources.get(scope).cloned()
    }
}
