//! Clients for the index store

use std::time::Duration;

use async_trait::async_trait;
use sealdex_core::{DocumentId, Posting, Result, SealdexError, Token};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::protocol::{read_frame, write_frame, StoreRequest, StoreResponse};
use crate::store::IndexStore;

/// Coordinator-side view of the index store
#[async_trait]
pub trait IndexStoreClient: Send + Sync {
    /// Postings for `token`; empty when unknown
    async fn lookup(&self, token: &Token) -> Result<Vec<Posting>>;

    /// Sealed blob of document `id`, if stored
    async fn document(&self, id: DocumentId) -> Result<Option<Vec<u8>>>;
}

/// Calls a store living in the same process
#[derive(Debug, Clone)]
pub struct InProcessClient {
    store: IndexStore,
}

impl InProcessClient {
    /// Wrap a store
    pub fn new(store: IndexStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IndexStoreClient for InProcessClient {
    async fn lookup(&self, token: &Token) -> Result<Vec<Posting>> {
        Ok(self.store.lookup(token))
    }

    async fn document(&self, id: DocumentId) -> Result<Option<Vec<u8>>> {
        self.store.document(id).await
    }
}

/// Talks to an [`IndexStoreServer`](crate::server::IndexStoreServer) over TCP
///
/// Each call opens a connection, sends one request frame and reads one reply.
/// The whole exchange is bounded by the request timeout.
#[derive(Debug, Clone)]
pub struct TcpIndexStoreClient {
    addr: String,
    request_timeout: Duration,
}

impl TcpIndexStoreClient {
    /// Client for the store at `addr`
    pub fn new(addr: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            request_timeout,
        }
    }

    /// Store address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn exchange(&self, request: StoreRequest) -> Result<StoreResponse> {
        let operation = match &request {
            StoreRequest::Lookup { .. } => "index lookup",
            StoreRequest::Document { .. } => "document fetch",
        };
        let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);

        let response = timeout(self.request_timeout, async {
            let mut stream = TcpStream::connect(&self.addr).await.map_err(|e| {
                SealdexError::transport(format!("TCP connect to {} failed: {e}", self.addr))
            })?;
            stream
                .set_nodelay(true)
                .map_err(|e| SealdexError::transport(format!("TCP nodelay failed: {e}")))?;
            write_frame(&mut stream, &request).await?;
            let response: Option<StoreResponse> = read_frame(&mut stream).await?;
            response.ok_or_else(|| {
                SealdexError::transport("store closed the connection without replying")
            })
        })
        .await
        .map_err(|_| SealdexError::timeout(operation, timeout_ms))??;
        debug!(addr = %self.addr, operation, "store replied");
        Ok(response)
    }
}

#[async_trait]
impl IndexStoreClient for TcpIndexStoreClient {
    async fn lookup(&self, token: &Token) -> Result<Vec<Posting>> {
        self.exchange(StoreRequest::lookup(token))
            .await?
            .into_postings()
    }

    async fn document(&self, id: DocumentId) -> Result<Option<Vec<u8>>> {
        self.exchange(StoreRequest::document(id))
            .await?
            .into_document()
    }
}
