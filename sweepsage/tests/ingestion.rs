//! Ingestion from a project directory into the persistent store, repeated runs included.
mod common;

use pretty_assertions::assert_eq;
use sweepsage_core::{
    SegmentGateway as _, VectorStore as _,
    test_utils::{MockChatCompletion, WordHashEmbedder},
};

#[test_log::test(tokio::test)]
async fn test_second_run_ingests_nothing_new() {
    let (dir, config) = common::project();
    let embedder = WordHashEmbedder::default();
    let app = common::app(
        &config,
        &MockChatCompletion::new(),
        common::generator("unused"),
        &embedder,
    );

    let first = app.ingestion_pipeline().unwrap().run().await.unwrap();
    assert_eq!(first.discovered, 2);
    assert_eq!(first.ingested, 2);
    assert!(first.segments_written >= 2);

    let stored = app.gateway().unwrap().store().count().await.unwrap();
    assert_eq!(stored, first.segments_written);

    let embed_calls = embedder.calls();
    let second = app.ingestion_pipeline().unwrap().run().await.unwrap();

    assert!(second.is_nothing_new());
    assert_eq!(second.skipped_existing, 2);
    assert_eq!(embedder.calls(), embed_calls);
    assert_eq!(
        app.gateway().unwrap().store().count().await.unwrap(),
        stored
    );

    let ledger = std::fs::read_to_string(dir.child("store").join("md5_hex_store")).unwrap();
    assert_eq!(ledger.lines().count(), 2);
}

#[test_log::test(tokio::test)]
async fn test_changed_file_is_ingested_again() {
    let (dir, config) = common::project();
    let embedder = WordHashEmbedder::default();
    let app = common::app(
        &config,
        &MockChatCompletion::new(),
        common::generator("unused"),
        &embedder,
    );

    app.ingestion_pipeline().unwrap().run().await.unwrap();

    std::fs::write(
        dir.child("data").join("charging.txt"),
        "Place the dock against a wall with free space on both sides.",
    )
    .unwrap();
    let summary = app.ingestion_pipeline().unwrap().run().await.unwrap();

    assert_eq!(summary.ingested, 1);
    assert_eq!(summary.skipped_existing, 1);
    assert!(!summary.is_nothing_new());
}

#[test_log::test(tokio::test)]
async fn test_ask_after_ingest_uses_stored_references() {
    let (_dir, config) = common::project();
    let embedder = WordHashEmbedder::default();
    let app = common::app(
        &config,
        &MockChatCompletion::new(),
        common::generator("Clean the contacts on the dock."),
        &embedder,
    );
    app.ingestion_pipeline().unwrap().run().await.unwrap();

    let references = app
        .gateway()
        .unwrap()
        .similarity_search("robot does not charge", 1)
        .await
        .unwrap();
    assert_eq!(references.len(), 1);
    assert!(references[0].text.contains("charging contacts"));

    let answer = app
        .rag_service()
        .unwrap()
        .summarize("The robot does not charge")
        .await
        .unwrap();
    assert_eq!(answer, "Clean the contacts on the dock.");
}
