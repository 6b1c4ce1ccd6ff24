mod common;

use chrono::NaiveDate;
use common::{load_fixture_bytes, FixtureResolver};
use hansard_ingest::configs::ImportConfig;
use hansard_ingest::error::{AlpheusError, ImportError};
use hansard_ingest::import::{import_document, ImportContext, ImportOptions, SourceDocument};
use hansard_ingest::runtime::logging::LogLevel;
use hansard_ingest::runtime::store::{MemoryStore, TranscriptStore};

fn source(date: Option<NaiveDate>) -> SourceDocument {
    SourceDocument {
        id: "debates-41-1-142".to_string(),
        date,
        xml_en: load_fixture_bytes("hansard/debates_en.xml"),
        xml_fr: load_fixture_bytes("hansard/debates_fr.xml"),
    }
}

fn reimport() -> ImportOptions {
    ImportOptions {
        reimport_preserving_sequence: true,
    }
}

#[tokio::test]
async fn imports_fresh_document() {
    let store = MemoryStore::new();
    let resolver = FixtureResolver::new();
    let config = ImportConfig::default();
    let ctx = ImportContext {
        store: &store,
        resolver: &resolver,
        config: &config,
    };

    let outcome = import_document(&ctx, &source(None), ImportOptions::default())
        .await
        .expect("import should succeed")
        .expect("document should be imported");

    assert!(outcome.mappings.is_empty());
    assert!(outcome.document.multilingual);
    assert_eq!(
        outcome.document.date,
        NaiveDate::from_ymd_opt(2012, 6, 11).expect("date")
    );
    let stored = store
        .statements("debates-41-1-142")
        .await
        .expect("store should answer");
    assert_eq!(stored, outcome.document.statements);
}

#[tokio::test]
async fn refuses_to_overwrite_without_reimport_option() {
    let store = MemoryStore::new();
    let resolver = FixtureResolver::new();
    let config = ImportConfig::default();
    let ctx = ImportContext {
        store: &store,
        resolver: &resolver,
        config: &config,
    };

    import_document(&ctx, &source(None), ImportOptions::default())
        .await
        .expect("first import should succeed");
    let second = import_document(&ctx, &source(None), ImportOptions::default())
        .await
        .expect("second import should not fail");

    assert!(second.is_none());
}

#[tokio::test]
async fn reimport_records_sequence_mappings_once() {
    let store = MemoryStore::new();
    let resolver = FixtureResolver::new();
    let config = ImportConfig::default();
    let ctx = ImportContext {
        store: &store,
        resolver: &resolver,
        config: &config,
    };

    import_document(&ctx, &source(None), ImportOptions::default())
        .await
        .expect("first import should succeed");
    let outcome = import_document(&ctx, &source(None), reimport())
        .await
        .expect("reimport should succeed")
        .expect("reimport should replace statements");

    assert_eq!(outcome.mappings.len(), 5);
    assert_eq!(
        store.mappings("debates-41-1-142").expect("store should answer"),
        outcome.mappings
    );
    assert!(store
        .has_sequence_mappings("debates-41-1-142")
        .await
        .expect("store should answer"));

    let third = import_document(&ctx, &source(None), reimport())
        .await
        .expect("third import should not fail");
    assert!(third.is_none());
}

#[tokio::test]
async fn keeps_known_date_and_flags_disagreement() {
    let store = MemoryStore::new();
    let resolver = FixtureResolver::new();
    let config = ImportConfig::default();
    let ctx = ImportContext {
        store: &store,
        resolver: &resolver,
        config: &config,
    };
    let known = NaiveDate::from_ymd_opt(2012, 6, 12).expect("date");

    let outcome = import_document(&ctx, &source(Some(known)), ImportOptions::default())
        .await
        .expect("import should succeed")
        .expect("document should be imported");

    assert_eq!(outcome.document.date, known);
    assert!(outcome
        .document
        .events
        .iter()
        .any(|e| e.level == LogLevel::Error && e.message.starts_with("Date mismatch")));
}

#[tokio::test]
async fn parse_failure_leaves_store_untouched() {
    let store = MemoryStore::new();
    let resolver = FixtureResolver::new();
    let config = ImportConfig::default();
    let ctx = ImportContext {
        store: &store,
        resolver: &resolver,
        config: &config,
    };
    let mut broken = source(None);
    broken.xml_fr = b"<Hansard xml:lang=\"fr\"><HansardBody><Mystery/></HansardBody></Hansard>".to_vec();

    let result = import_document(&ctx, &broken, ImportOptions::default()).await;

    assert!(matches!(
        result,
        Err(ImportError::Parse(AlpheusError::MissingMetadata(_)))
    ));
    assert!(store
        .statements("debates-41-1-142")
        .await
        .expect("store should answer")
        .is_empty());
}
