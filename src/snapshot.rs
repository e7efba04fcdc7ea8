//! Consumer-facing view of the corpus.
//!
//! The display layer receives exactly one of: a complete view, an explicit
//! insufficient-history view, or a load failure. Never a partial aggregate.

use serde::Serialize;

use crate::aggregate::{aggregate_with, DailyAggregate, WindowMode};
use crate::alerts::{alerts, Alert};
use crate::article::ScoredArticle;
use crate::corpus::{recent, CorpusStore};
use crate::normalize::display_title;
use crate::status::{status, SentimentStatus};
use crate::topics::{hot_topics, TopicCount, DEFAULT_TOPIC_COUNT};

pub const DEFAULT_RECENT_COUNT: usize = 5;

/// Article row prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentArticle {
    pub date: chrono::NaiveDate,
    pub title: String,
    pub url: String,
    pub score: f64,
}

impl From<ScoredArticle> for RecentArticle {
    fn from(r: ScoredArticle) -> Self {
        Self {
            date: r.date,
            title: display_title(&r.title),
            url: r.url,
            score: r.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Snapshot {
    Ready {
        aggregates: Vec<DailyAggregate>,
        status: SentimentStatus,
        alerts: Vec<Alert>,
        recent: Vec<RecentArticle>,
        topics: Vec<TopicCount>,
    },
    InsufficientHistory {
        aggregates: Vec<DailyAggregate>,
        status: SentimentStatus,
        recent: Vec<RecentArticle>,
    },
    LoadFailed {
        reason: String,
    },
}

impl Snapshot {
    /// Build from an in-memory corpus.
    pub fn from_corpus(corpus: &[ScoredArticle], mode: WindowMode) -> Self {
        let aggregates = aggregate_with(corpus, mode);
        let recent_rows: Vec<RecentArticle> = recent(corpus, DEFAULT_RECENT_COUNT)
            .into_iter()
            .map(RecentArticle::from)
            .collect();

        match status(&aggregates) {
            Ok(status) => {
                let alerts = alerts(&aggregates);
                Snapshot::Ready {
                    alerts,
                    status,
                    recent: recent_rows,
                    topics: hot_topics(corpus, DEFAULT_TOPIC_COUNT),
                    aggregates,
                }
            }
            Err(_) => Snapshot::InsufficientHistory {
                aggregates,
                status: SentimentStatus::insufficient(),
                recent: recent_rows,
            },
        }
    }

    /// Load the corpus and build; a load error becomes `LoadFailed`.
    pub fn load(store: &CorpusStore, mode: WindowMode) -> Self {
        match store.load() {
            Ok(corpus) => Self::from_corpus(&corpus, mode),
            Err(e) => {
                tracing::warn!(error = %e, "snapshot: corpus load failed");
                Snapshot::LoadFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn alerts(&self) -> &[Alert] {
        match self {
            Snapshot::Ready { alerts, .. } => alerts,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn row(day: u32, score: f64) -> ScoredArticle {
        ScoredArticle {
            date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            title: format!("Ethereum(ETH) story {day}"),
            url: format!("https://news.test/{day}"),
            score,
            description: None,
        }
    }

    #[test]
    fn one_day_is_insufficient() {
        let snap = Snapshot::from_corpus(&[row(1, 0.4)], WindowMode::Rows);
        let v: Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["state"], "insufficient_history");
        assert_eq!(v["status"]["label"], "NEUTRAL");
        assert_eq!(v["status"]["score"], 50.0);
        assert_eq!(v["recent"][0]["title"], "Ethereum (ETH) story 1");
    }

    #[test]
    fn two_days_are_ready() {
        let snap = Snapshot::from_corpus(&[row(1, 0.0), row(2, 0.5)], WindowMode::Rows);
        match &snap {
            Snapshot::Ready {
                aggregates, alerts, ..
            } => {
                assert_eq!(aggregates.len(), 2);
                assert_eq!(alerts.len(), 1);
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(snap.alerts().len(), 1);
    }

    #[test]
    fn unreadable_corpus_is_load_failed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("scores.jsonl");
        std::fs::write(&p, "garbage\n").unwrap();
        let snap = Snapshot::load(&CorpusStore::new(&p), WindowMode::Rows);
        assert!(matches!(snap, Snapshot::LoadFailed { .. }));
    }
}
