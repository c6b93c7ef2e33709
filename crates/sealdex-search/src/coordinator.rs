//! Search coordinator
//!
//! Runs on the custodian's side. For each request it pairs the requester's
//! share with the custodian's own share for the same access group, rebuilds the
//! key through the bounds-checked validator, and uses that key only for the
//! duration of the call.

use std::time::Duration;

use sealdex_core::{DocumentId, ParticipantId, RankedResult, Result, SealdexError};
use sealdex_crypto::{derive_token, open_text, SymmetricKey};
use sealdex_sharing::{
    combine_secret_from_shares, CustodianBundle, ParticipantShareBundle, SecretShareTable,
    ShareContract, FILE_KEY_SECRET,
};
use tokio::time::timeout;
use tracing::{debug, info};
use zeroize::Zeroize;

use crate::client::IndexStoreClient;
use crate::protocol::{decode_base64, FetchRequest, SearchRequest};
use crate::ranker::rank;

/// Reconstructs keys per request and queries the index store
pub struct SearchCoordinator<C> {
    custodian: CustodianBundle,
    client: C,
    key_bytes: usize,
    request_timeout: Duration,
}

impl<C: IndexStoreClient> SearchCoordinator<C> {
    /// Create a coordinator for keys of `key_bytes` bytes
    pub fn new(
        custodian: CustodianBundle,
        client: C,
        key_bytes: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            custodian,
            client,
            key_bytes,
            request_timeout,
        }
    }

    /// Ranked results for one keyword
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<RankedResult>> {
        let index_key = self.reconstruct_key(
            request.participant,
            &request.share_base64,
            request.secret_index,
            request.group_index,
        )?;

        let keyword = request.keyword.to_lowercase();
        let token = derive_token(&index_key, &keyword)?;
        let postings = self
            .bounded("index lookup", self.client.lookup(&token))
            .await?;
        debug!(postings = postings.len(), "postings received");

        let ranked = rank(&index_key, &postings)?;
        info!(
            participant = request.participant,
            results = ranked.len(),
            "search completed"
        );
        Ok(ranked)
    }

    /// Plaintext of one stored document, `None` when the id is unknown
    pub async fn fetch_document(&self, request: &FetchRequest) -> Result<Option<String>> {
        let file_key = self.reconstruct_key(
            request.participant,
            &request.share_base64,
            FILE_KEY_SECRET,
            request.group_index,
        )?;

        let id = DocumentId(request.doc_id);
        let blob = self
            .bounded("document fetch", self.client.document(id))
            .await?;
        match blob {
            Some(blob) => {
                let text = open_text(&file_key, &blob)?;
                info!(participant = request.participant, doc_id = id.0, "document opened");
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn reconstruct_key(
        &self,
        participant: u16,
        share_base64: &str,
        secret_index: usize,
        group_index: usize,
    ) -> Result<SymmetricKey> {
        let participant = ParticipantId::new(participant)?;
        let share = decode_base64("share_base64", share_base64)?;
        let requester = ParticipantShareBundle::single(participant, secret_index, group_index, share);

        let dealer = &self.custodian.dealer;
        let shares =
            SecretShareTable::assemble(dealer.access_structures(), &[&self.custodian.shares, &requester]);
        let secret = combine_secret_from_shares(dealer, &shares, secret_index, group_index)?;

        let mut secret_bytes = secret.to_bytes_be();
        let key = SymmetricKey::from_secret_bytes(&secret_bytes, self.key_bytes);
        secret_bytes.zeroize();
        key
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
        timeout(self.request_timeout, call)
            .await
            .map_err(|_| SealdexError::timeout(operation, timeout_ms))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InProcessClient;
    use crate::protocol::encode_base64;
    use crate::store::IndexStore;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use num_bigint::BigUint;
    use sealdex_core::{EncryptedIndex, Posting, ShareDimension, Token};
    use sealdex_crypto::Effects;
    use sealdex_sharing::{distribute, setup_key_custody};

    struct Fixture {
        coordinator: SearchCoordinator<InProcessClient>,
        users: Vec<ParticipantShareBundle>,
    }

    fn fixture(index: EncryptedIndex) -> (Fixture, SymmetricKey) {
        let effects = Effects::test();
        let index_key = SymmetricKey::from_bytes(vec![7; 16]).unwrap();
        let file_key = SymmetricKey::from_bytes(vec![8; 16]).unwrap();
        let prime = BigUint::from(1u8) << 200usize;
        let (dealer, table) = setup_key_custody(prime, &index_key, &file_key, 3, &effects).unwrap();
        let (users, custodian) = distribute(&dealer, &table).unwrap();
        let coordinator = SearchCoordinator::new(
            custodian,
            InProcessClient::new(IndexStore::from_index(index)),
            16,
            Duration::from_secs(1),
        );
        (Fixture { coordinator, users }, index_key)
    }

    fn request(user: &ParticipantShareBundle, secret: usize, group: usize, keyword: &str) -> SearchRequest {
        let share = user.share(secret, group).map(|s| s.value().to_vec()).unwrap_or_default();
        SearchRequest {
            participant: user.participant().value(),
            share_base64: encode_base64(&share),
            secret_index: secret,
            group_index: group,
            keyword: keyword.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_keyword_is_empty() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        let results = fixture
            .coordinator
            .search(&request(&fixture.users[0], 0, 0, "anything"))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_keyword_is_lowercased() {
        let index_key = SymmetricKey::from_bytes(vec![7; 16]).unwrap();
        let posting = Posting::new(
            sealdex_crypto::encrypt_keyword(&index_key, "2").unwrap(),
            sealdex_crypto::encrypt_keyword(&index_key, "0").unwrap(),
        );
        let index = EncryptedIndex {
            entries: vec![sealdex_core::IndexEntry {
                token: derive_token(&index_key, "cloud").unwrap(),
                postings: vec![posting],
            }],
        };
        let (fixture, _) = fixture(index);
        for keyword in ["cloud", "Cloud", "CLOUD", "cLOuD"] {
            let results = fixture
                .coordinator
                .search(&request(&fixture.users[1], 0, 1, keyword))
                .await
                .unwrap();
            assert_eq!(results.len(), 1, "{keyword}");
            assert_eq!(results[0].term_frequency, 2);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_group() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        let err = fixture
            .coordinator
            .search(&request(&fixture.users[0], 0, 3, "cloud"))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            SealdexError::OutOfRange { dimension: ShareDimension::Group, index: 3, len: 3 }
        );
    }

    #[tokio::test]
    async fn test_out_of_range_secret() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        let err = fixture
            .coordinator
            .search(&request(&fixture.users[0], 2, 0, "cloud"))
            .await
            .unwrap_err();
        assert_matches!(err, SealdexError::OutOfRange { dimension: ShareDimension::Secret, .. });
    }

    #[tokio::test]
    async fn test_wrong_group_for_user() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        // User 1 belongs to group 0 only.
        let mut req = request(&fixture.users[0], 0, 0, "cloud");
        req.group_index = 2;
        let err = fixture.coordinator.search(&req).await.unwrap_err();
        assert_matches!(err, SealdexError::Reconstruction { .. });
    }

    #[tokio::test]
    async fn test_bad_share_encoding() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        let mut req = request(&fixture.users[0], 0, 0, "cloud");
        req.share_base64 = "%%%".into();
        let err = fixture.coordinator.search(&req).await.unwrap_err();
        assert_matches!(err, SealdexError::Serialization { .. });
    }

    struct StalledClient;

    #[async_trait]
    impl IndexStoreClient for StalledClient {
        async fn lookup(&self, _token: &Token) -> Result<Vec<Posting>> {
            std::future::pending().await
        }

        async fn document(&self, _id: DocumentId) -> Result<Option<Vec<u8>>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_store_call_times_out() {
        let (fixture, _) = fixture(EncryptedIndex::default());
        let Fixture { coordinator, users } = fixture;
        let stalled = SearchCoordinator::new(
            coordinator.custodian,
            StalledClient,
            16,
            Duration::from_millis(20),
        );
        let err = stalled
            .search(&request(&users[0], 0, 0, "cloud"))
            .await
            .unwrap_err();
        assert_matches!(err, SealdexError::Timeout { .. });
    }
}
