//! Corpus file to on-disk index

use std::io::Write;

use sealdex_core::DocumentId;
use sealdex_crypto::{decrypt_keyword, derive_token, open_text, Effects, SymmetricKey};
use sealdex_index::{
    persist, read_index, read_keywords, IndexBuilder, JsonFileSource, DOCS_DIR, INDEX_FILE,
    KEYWORDS_FILE,
};

const CORPUS_NDJSON: &str = r#"{"title":"Cloud Computing","text":"Cloud computing is the delivery of computing services."}
{"title":"Distributed Systems","text":"Distributed systems use multiple computing nodes."}
this line is not json
{"title":"Cybersecurity","text":"Security in computing systems is crucial."}
"#;

fn keys() -> (SymmetricKey, SymmetricKey) {
    let effects = Effects::for_test("build_and_persist");
    (
        SymmetricKey::generate(16, &effects).unwrap(),
        SymmetricKey::generate(16, &effects).unwrap(),
    )
}

#[tokio::test]
async fn ndjson_corpus_round_trips_through_disk() {
    let mut corpus = tempfile::NamedTempFile::new().unwrap();
    corpus.write_all(CORPUS_NDJSON.as_bytes()).unwrap();
    let out = tempfile::tempdir().unwrap();

    let (index_key, file_key) = keys();
    let builder =
        IndexBuilder::new(index_key.clone(), file_key.clone(), 1, Effects::test()).unwrap();
    let built = builder
        .build_from(&JsonFileSource::new(corpus.path()))
        .unwrap();
    assert_eq!(built.documents.len(), 3);

    let report = persist(&built, out.path(), 2).await.unwrap();
    assert_eq!(report.documents_written, 3);
    assert_eq!(report.index_path, out.path().join(INDEX_FILE));

    let keywords = read_keywords(&out.path().join(KEYWORDS_FILE)).await.unwrap();
    assert!(keywords.contains(&"computing".to_string()));
    assert!(keywords.contains(&"cloud".to_string()));
    assert!(!keywords.contains(&"crucial".to_string()));

    let index = read_index(&out.path().join(INDEX_FILE)).await.unwrap();
    assert_eq!(index, built.index);
    let cloud = index.get(&derive_token(&index_key, "cloud").unwrap()).unwrap();
    assert_eq!(cloud.len(), 1);
    assert_eq!(decrypt_keyword(&index_key, &cloud[0].encrypted_count).unwrap(), "2");

    let blob = std::fs::read(out.path().join(DOCS_DIR).join("1")).unwrap();
    assert_eq!(
        open_text(&file_key, &blob).unwrap(),
        "Distributed Systems Distributed systems use multiple computing nodes."
    );
}

#[tokio::test]
async fn rebuild_replaces_document_directory() {
    let out = tempfile::tempdir().unwrap();
    let stale = out.path().join(DOCS_DIR).join("99");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, b"stale").unwrap();

    let (index_key, file_key) = keys();
    let builder = IndexBuilder::new(index_key, file_key, 0, Effects::test()).unwrap();
    let built = builder
        .build(&[sealdex_index::Document::new("Only", "one document")])
        .unwrap();
    assert_eq!(built.documents[0].id, DocumentId(0));

    persist(&built, out.path(), 4).await.unwrap();
    assert!(!stale.exists());
    assert!(out.path().join(DOCS_DIR).join("0").exists());
}

#[tokio::test]
async fn zero_write_concurrency_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    let (index_key, file_key) = keys();
    let builder = IndexBuilder::new(index_key, file_key, 0, Effects::test()).unwrap();
    let built = builder.build(&[]).unwrap();
    assert!(persist(&built, out.path(), 0).await.is_err());
}
