// tests/e2e_smoke.rs
//
// File feed → default classifiers + seed lexicon → corpus → snapshot.

use std::path::PathBuf;
use std::sync::Arc;

use crypto_news_sentiment::aggregate::WindowMode;
use crypto_news_sentiment::config::AppConfig;
use crypto_news_sentiment::corpus::CorpusStore;
use crypto_news_sentiment::feed::{DateRange, FeedProvider, FileFeed};
use crypto_news_sentiment::lexicon::Lexicon;
use crypto_news_sentiment::pipeline::run_cycle;
use crypto_news_sentiment::snapshot::Snapshot;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/feed.json")
}

#[tokio::test]
async fn file_feed_to_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = CorpusStore::new(dir.path().join("scores.jsonl"));
    let engine = AppConfig::default()
        .build_engine(Arc::new(Lexicon::default_seed()))
        .expect("default engine");
    let feed = FileFeed::new(fixture());
    assert_eq!(feed.name(), "file");

    let report = run_cycle(&feed, &engine, &store, DateRange::last_day(), 5)
        .await
        .expect("cycle");
    assert_eq!(report.fetched, 6);
    assert_eq!(report.malformed, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.accepted, 4);

    let corpus = store.load().unwrap();
    assert_eq!(corpus.len(), 4);
    assert!(corpus.iter().all(|r| (-1.0..=1.0).contains(&r.score)));

    let hack = corpus
        .iter()
        .find(|r| r.url.ends_with("exchange-hack"))
        .unwrap();
    let record = corpus
        .iter()
        .find(|r| r.url.ends_with("btc-record"))
        .unwrap();
    assert!(hack.score < record.score, "{} vs {}", hack.score, record.score);

    // Two days of history: status is computable.
    match Snapshot::load(&store, WindowMode::Rows) {
        Snapshot::Ready { aggregates, .. } => assert_eq!(aggregates.len(), 2),
        other => panic!("expected ready snapshot, got {other:?}"),
    }

    // Re-running the same feed adds nothing.
    let again = run_cycle(&feed, &engine, &store, DateRange::last_day(), 5)
        .await
        .unwrap();
    assert_eq!(again.persisted, 0);
    assert_eq!(again.duplicates, 5);
}
