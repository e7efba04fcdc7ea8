//! # Market Sentiment Status
//! Maps the latest aggregate row and its trend to a bounded 0–100 index with
//! a BULLISH / NEUTRAL / BEARISH label. No I/O; recomputed on every read.
//!
//! ```text
//! short_trend      = latest.ma3 - latest.ma7
//! medium_trend     = latest.ma7 - prev.ma7
//! base             = (latest.mean_score + 1) * 50
//! trend_adjustment = (short_trend + medium_trend) * 10
//! score            = clamp(base + trend_adjustment, 0, 100)
//! ```
//!
//! A trend term with an undefined moving average contributes 0.

use serde::{Deserialize, Serialize};

use crate::aggregate::DailyAggregate;
use crate::error::{Result, SentimentError};

pub const BULLISH_THRESHOLD: f64 = 60.0;
pub const BEARISH_THRESHOLD: f64 = 40.0;
/// Index reported when there is not enough history.
pub const DEFAULT_SCORE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusLabel {
    Bullish,
    Neutral,
    Bearish,
}

impl StatusLabel {
    pub fn for_score(score: f64) -> Self {
        if score >= BULLISH_THRESHOLD {
            StatusLabel::Bullish
        } else if score >= BEARISH_THRESHOLD {
            StatusLabel::Neutral
        } else {
            StatusLabel::Bearish
        }
    }

    pub fn rationale(self) -> &'static str {
        match self {
            StatusLabel::Bullish => "Positive sentiment with stable/upward trend",
            StatusLabel::Neutral => "Mixed or neutral sentiment signals",
            StatusLabel::Bearish => "Negative sentiment or declining trends",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentStatus {
    pub label: StatusLabel,
    /// Index in [0, 100].
    pub score: f64,
    pub rationale: String,
}

impl SentimentStatus {
    /// NEUTRAL/50 substitute used when fewer than two rows exist.
    pub fn insufficient() -> Self {
        Self {
            label: StatusLabel::Neutral,
            score: DEFAULT_SCORE,
            rationale: "Not enough data for trend analysis".to_string(),
        }
    }
}

fn diff(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a - b,
        _ => 0.0,
    }
}

/// Status from the last two aggregate rows.
pub fn status(aggregates: &[DailyAggregate]) -> Result<SentimentStatus> {
    let [.., prev, latest] = aggregates else {
        return Err(SentimentError::InsufficientHistory {
            rows: aggregates.len(),
        });
    };

    let short_trend = diff(latest.ma3, latest.ma7);
    let medium_trend = diff(latest.ma7, prev.ma7);
    let base = (latest.mean_score + 1.0) * 50.0;
    let trend_adjustment = (short_trend + medium_trend) * 10.0;
    let score = (base + trend_adjustment).clamp(0.0, 100.0);

    let label = StatusLabel::for_score(score);
    Ok(SentimentStatus {
        label,
        score,
        rationale: label.rationale().to_string(),
    })
}

/// [`status`], substituting [`SentimentStatus::insufficient`] for short history.
pub fn status_or_default(aggregates: &[DailyAggregate]) -> SentimentStatus {
    status(aggregates).unwrap_or_else(|_| SentimentStatus::insufficient())
}
