//! In-memory fakes for the core's collaborators

use as_service::errors::AsError;
use as_service::models::{Principal, RegisteredClient};
use as_service::repositories::{ClientDirectory, IdentityProvider};
use common::types::ClientId;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fake identity provider for unit testing.
pub struct FakeIdentityProvider {
    principal: Option<Principal>,
    return_error: bool,
    call_count: AtomicUsize,
}

impl FakeIdentityProvider {
    /// A provider with a signed-in user.
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            return_error: false,
            call_count: AtomicUsize::new(0),
        }
    }

    /// A provider with no authenticated user.
    pub fn anonymous() -> Self {
        Self {
            principal: None,
            return_error: false,
            call_count: AtomicUsize::new(0),
        }
    }

    /// A provider whose store is down.
    pub fn failing() -> Self {
        Self {
            principal: None,
            return_error: true,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn authenticated_principal(&self) -> Result<Option<Principal>, AsError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.return_error {
            return Err(AsError::Dependency("identity store unavailable".to_string()));
        }
        Ok(self.principal.clone())
    }
}

/// Identity provider that never answers, for cancellation tests.
pub struct PendingIdentityProvider;

#[async_trait::async_trait]
impl IdentityProvider for PendingIdentityProvider {
    async fn authenticated_principal(&self) -> Result<Option<Principal>, AsError> {
        std::future::pending().await
    }
}

/// Client directory whose every call fails.
pub struct FailingClientDirectory;

#[async_trait::async_trait]
impl ClientDirectory for FailingClientDirectory {
    async fn find_client(&self, _client_id: &ClientId) -> Result<Option<RegisteredClient>, AsError> {
        Err(AsError::Dependency("client directory unreachable".to_string()))
    }

    async fn list_clients(
        &self,
        _page_size: usize,
        _offset: usize,
    ) -> Result<Vec<RegisteredClient>, AsError> {
        Err(AsError::Dependency("client directory unreachable".to_string()))
    }
}

/// Client directory that never answers, for cancellation tests.
pub struct PendingClientDirectory;

#[async_trait::async_trait]
impl ClientDirectory for PendingClientDirectory {
    async fn find_client(&self, _client_id: &ClientId) -> Result<Option<RegisteredClient>, AsError> {
        std::future::pending().await
    }

    async fn list_clients(
        &self,
        _page_size: usize,
        _offset: usize,
    ) -> Result<Vec<RegisteredClient>, AsError> {
        std::future::pending().await
    }
}

/// Wrapper that counts calls made to an inner directory.
pub struct CountingClientDirectory<D> {
    inner: D,
    find_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl<D: ClientDirectory> CountingClientDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            find_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `find_client` calls made.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of pages requested through `list_clients`.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl<D: ClientDirectory> ClientDirectory for CountingClientDirectory<D> {
    async fn find_client(&self, client_id: &ClientId) -> Result<Option<RegisteredClient>, AsError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_client(client_id).await
    }

    async fn list_clients(
        &self,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<RegisteredClient>, AsError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_clients(page_size, offset).await
    }
}
