//! TCP front end for the index store

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use sealdex_core::{Result, SealdexError};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::protocol::{read_frame, write_frame, StoreRequest, StoreResponse};
use crate::store::IndexStore;

/// How long a connection may sit between requests unless configured
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Serves one [`IndexStore`] to any number of connections
pub struct IndexStoreServer {
    store: IndexStore,
    listener: TcpListener,
    idle_timeout: Duration,
}

impl IndexStoreServer {
    /// Bind to `addr`; port 0 picks a free port
    pub async fn bind(addr: &str, store: IndexStore) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SealdexError::transport(format!("TCP bind to {addr} failed: {e}")))?;
        Ok(Self {
            store,
            listener,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        })
    }

    /// Drop connections that send no request within `idle_timeout`
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| SealdexError::transport(format!("no local address: {e}")))
    }

    /// Accept connections forever
    pub async fn serve(self) -> Result<()> {
        self.serve_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves
    pub async fn serve_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(addr = %self.local_addr()?, tokens = self.store.len(), "index store listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("index store shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!(error = %err, "TCP accept failed");
                            continue;
                        }
                    };
                    let store = self.store.clone();
                    let idle_timeout = self.idle_timeout;
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(store, stream, idle_timeout).await {
                            debug!(%peer, error = %err, "connection closed with error");
                        }
                    });
                }
            }
        }
    }
}

async fn handle_connection(
    store: IndexStore,
    mut stream: TcpStream,
    idle_timeout: Duration,
) -> Result<()> {
    stream
        .set_nodelay(true)
        .map_err(|e| SealdexError::transport(format!("TCP nodelay failed: {e}")))?;
    loop {
        let read = timeout(idle_timeout, read_frame::<_, StoreRequest>(&mut stream)).await;
        let request = match read {
            Err(_) => {
                debug!(idle_ms = idle_timeout.as_millis() as u64, "closing idle connection");
                return Ok(());
            }
            Ok(Ok(Some(request))) => request,
            Ok(Ok(None)) => return Ok(()),
            Ok(Err(err)) => {
                let reply = StoreResponse::Error {
                    error: err.to_string(),
                };
                write_frame(&mut stream, &reply).await?;
                return Err(err);
            }
        };
        let response = store.handle(request).await;
        write_frame(&mut stream, &response).await?;
    }
}
