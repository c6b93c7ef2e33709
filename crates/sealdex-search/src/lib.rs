//! # Sealdex Search - Query Path
//!
//! - **Store**: read-only encrypted index and sealed documents
//! - **Server / client**: length-prefixed JSON over TCP, plus an in-process client
//! - **Coordinator**: per-request key reconstruction, token derivation, bounded store calls
//! - **Ranker**: decrypt postings and order by term frequency

#![forbid(unsafe_code)]
#![allow(clippy::result_large_err)]

/// Index store clients
pub mod client;
/// Search coordinator
pub mod coordinator;
/// Wire messages and framing
pub mod protocol;
/// Result ranking
pub mod ranker;
/// TCP store server
pub mod server;
/// Index store service
pub mod store;

pub use client::{InProcessClient, IndexStoreClient, TcpIndexStoreClient};
pub use coordinator::SearchCoordinator;
pub use protocol::{
    decode_base64, encode_base64, FetchRequest, SearchRequest, StoreRequest, StoreResponse,
    WirePosting, MAX_FRAME_LEN,
};
pub use ranker::rank;
pub use server::{IndexStoreServer, DEFAULT_IDLE_TIMEOUT};
pub use store::IndexStore;
