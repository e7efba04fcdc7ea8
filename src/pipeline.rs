//! Ingestion cycle: fetch → validate → dedup → fuse → append.
//!
//! Per-article failures (malformed record, classifier error) are logged and
//! counted; the batch continues. Per-cycle failures (feed, corpus read or
//! append) abort the cycle and leave the corpus untouched.

use std::time::Duration;

use metrics::{counter, gauge};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::article::{Article, ScoredArticle};
use crate::corpus::CorpusStore;
use crate::dedup::{Admission, DedupIndex};
use crate::error::Result;
use crate::feed::{DateRange, FeedProvider};
use crate::fusion::FusionEngine;
use crate::metrics::describe_ingest_metrics;

/// Counts for one ingestion cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub fetched: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub inference_failures: usize,
    pub accepted: usize,
    pub deferred: usize,
    /// Rows actually written (accepted minus rows a concurrent cycle stored first).
    pub persisted: usize,
}

/// Run one cycle against `feed` with a batch cap of `cap` accepted articles.
pub async fn run_cycle(
    feed: &dyn FeedProvider,
    engine: &FusionEngine,
    store: &CorpusStore,
    range: DateRange,
    cap: usize,
) -> Result<IngestReport> {
    describe_ingest_metrics();

    let raw = feed.fetch(range).await.inspect_err(|e| {
        tracing::warn!(target: "ingest", error = %e, provider = feed.name(), "feed fetch failed");
        counter!("ingest_cycle_errors_total").increment(1);
    })?;

    let history = store.keys().inspect_err(|e| {
        tracing::error!(target: "ingest", error = %e, "corpus load failed");
        counter!("ingest_cycle_errors_total").increment(1);
    })?;

    let mut report = IngestReport {
        fetched: raw.len(),
        ..Default::default()
    };
    let mut index = DedupIndex::new(history, cap);
    let mut batch: Vec<ScoredArticle> = Vec::new();

    for item in raw {
        let article = match Article::try_from(item) {
            Ok(a) => a,
            Err(e) => {
                tracing::debug!(target: "ingest", error = %e, "rejecting malformed article");
                report.malformed += 1;
                continue;
            }
        };

        let key = article.key();
        match index.check(&key) {
            Admission::Duplicate => {
                report.duplicates += 1;
                continue;
            }
            Admission::Deferred => {
                report.deferred += 1;
                continue;
            }
            Admission::New => {}
        }

        match engine.score(&article).await {
            Ok(fused) => {
                tracing::debug!(
                    target: "ingest",
                    url = %article.url,
                    score = fused.score,
                    verification = ?fused.verification,
                    "article scored"
                );
                batch.push(ScoredArticle::from_article(&article, fused.score));
                index.accept(key);
            }
            Err(e) => {
                tracing::warn!(
                    target: "ingest",
                    url = %article.url,
                    error = %e,
                    "skipping article"
                );
                report.inference_failures += 1;
                index.mark_seen(key);
            }
        }
    }
    report.accepted = batch.len();

    report.persisted = store.append(&batch).inspect_err(|e| {
        tracing::error!(target: "ingest", error = %e, "corpus append failed; cycle aborted");
        counter!("ingest_cycle_errors_total").increment(1);
    })?;

    counter!("ingest_fetched_total").increment(report.fetched as u64);
    counter!("ingest_accepted_total").increment(report.persisted as u64);
    counter!("ingest_duplicates_total").increment(report.duplicates as u64);
    counter!("ingest_malformed_total").increment(report.malformed as u64);
    counter!("ingest_inference_failures_total").increment(report.inference_failures as u64);
    counter!("ingest_deferred_total").increment(report.deferred as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        target: "ingest",
        fetched = report.fetched,
        accepted = report.accepted,
        persisted = report.persisted,
        duplicates = report.duplicates,
        malformed = report.malformed,
        inference_failures = report.inference_failures,
        deferred = report.deferred,
        "ingest cycle finished"
    );
    Ok(report)
}

/// Run a cycle every `interval`, starting immediately. Errors are logged and
/// the next tick proceeds.
pub fn spawn_scheduler(
    feed: Box<dyn FeedProvider>,
    engine: FusionEngine,
    store: CorpusStore,
    cap: usize,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) =
                run_cycle(feed.as_ref(), &engine, &store, DateRange::last_day(), cap).await
            {
                tracing::warn!(target: "ingest", error = %e, "scheduled ingest cycle failed");
            }
        }
    })
}
