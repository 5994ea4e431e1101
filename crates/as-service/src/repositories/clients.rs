use crate::errors::AsError;
use crate::models::RegisteredClient;
use crate::observability::metrics::record_directory_query;
use common::types::ClientId;
use futures::stream::{self, Stream, TryStreamExt};
use std::collections::BTreeMap;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Read access to the registered-client directory.
///
/// Implementations own persistence. The core never writes through this trait.
#[async_trait::async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Look up one client by id.
    async fn find_client(&self, client_id: &ClientId) -> Result<Option<RegisteredClient>, AsError>;

    /// One page of clients in a stable order, starting at `offset`.
    ///
    /// A page shorter than `page_size` (or empty) is the last one.
    async fn list_clients(
        &self,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<RegisteredClient>, AsError>;
}

/// Look up a client, recording the directory query metric.
pub async fn find_registered_client<D>(
    directory: &D,
    client_id: &ClientId,
) -> Result<Option<RegisteredClient>, AsError>
where
    D: ClientDirectory + ?Sized,
{
    let start = Instant::now();
    let result = directory.find_client(client_id).await;

    let status = if result.is_ok() { "success" } else { "error" };
    record_directory_query("find", status, start.elapsed());

    result
}

/// Lazily enumerate every registered client, one page at a time.
///
/// Pages are fetched only as the stream is polled, so a consumer that stops
/// early never reads the remaining pages. Enumeration always starts at
/// offset 0. A `page_size` of 0 is treated as 1.
pub fn enumerate_clients<'a, D>(
    directory: &'a D,
    page_size: usize,
) -> impl Stream<Item = Result<RegisteredClient, AsError>> + Send + 'a
where
    D: ClientDirectory + ?Sized,
{
    let page_size = page_size.max(1);

    stream::try_unfold(Some(0usize), move |next_offset| async move {
        let Some(offset) = next_offset else {
            return Ok(None);
        };

        let start = Instant::now();
        let result = directory.list_clients(page_size, offset).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_directory_query("list", status, start.elapsed());

        let page = result?;
        debug!(
            target: "as.repositories.clients",
            offset = offset,
            returned = page.len(),
            "Fetched client directory page"
        );

        if page.is_empty() {
            return Ok(None);
        }
        let next = (page.len() >= page_size).then_some(offset + page.len());

        Ok::<_, AsError>(Some((
            stream::iter(page.into_iter().map(Ok::<_, AsError>)),
            next,
        )))
    })
    .try_flatten()
}

/// Result of [`InMemoryClientDirectory::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertOutcome::Created => "created",
            UpsertOutcome::Updated => "updated",
        }
    }
}

/// Client directory held in process memory, ordered by client id.
#[derive(Debug, Default)]
pub struct InMemoryClientDirectory {
    clients: RwLock<BTreeMap<ClientId, RegisteredClient>>,
}

impl InMemoryClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(clients: impl IntoIterator<Item = RegisteredClient>) -> Self {
        Self {
            clients: RwLock::new(
                clients
                    .into_iter()
                    .map(|c| (c.client_id.clone(), c))
                    .collect(),
            ),
        }
    }

    /// Insert the client, replacing any entry with the same id.
    pub async fn upsert(&self, client: RegisteredClient) -> UpsertOutcome {
        let start = Instant::now();
        let previous = self
            .clients
            .write()
            .await
            .insert(client.client_id.clone(), client);
        record_directory_query("upsert", "success", start.elapsed());

        match previous {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        }
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ClientDirectory for InMemoryClientDirectory {
    async fn find_client(&self, client_id: &ClientId) -> Result<Option<RegisteredClient>, AsError> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn list_clients(
        &self,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<RegisteredClient>, AsError> {
        Ok(self
            .clients
            .read()
            .await
            .values()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect())
    }
}
