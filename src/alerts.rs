//! Trend alerts over the daily aggregate series.
//!
//! Evaluation is stateless: the same window yields the same alerts on every
//! read. Each alert carries a stable id (`kind|date` hashed), so consumers can
//! suppress repeats through an [`AlertLedger`].

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::aggregate::DailyAggregate;
use crate::error::{Result, SentimentError};

/// Day-over-day change in mean score that counts as a shift.
pub const SHIFT_THRESHOLD: f64 = 0.2;
/// Rows considered by the shift check.
const SHIFT_LOOKBACK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SentimentShift,
    BullishCrossover,
    BearishCrossover,
}

impl AlertKind {
    fn as_str(self) -> &'static str {
        match self {
            AlertKind::SentimentShift => "sentiment_shift",
            AlertKind::BullishCrossover => "bullish_crossover",
            AlertKind::BearishCrossover => "bearish_crossover",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    /// Date of the aggregate row that triggered the alert.
    pub date: NaiveDate,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Alert {
    fn new(kind: AlertKind, date: NaiveDate, message: String, score: Option<f64>) -> Self {
        Self {
            id: alert_id(kind, date),
            kind,
            date,
            message,
            score,
        }
    }
}

/// First 16 hex chars of SHA-256 over `kind|date`.
pub fn alert_id(kind: AlertKind, date: NaiveDate) -> String {
    let digest = Sha256::digest(format!("{}|{}", kind.as_str(), date).as_bytes());
    format!("{digest:x}").chars().take(16).collect()
}

/// Evaluate shift and crossover alerts on the latest rows.
pub fn alerts(aggregates: &[DailyAggregate]) -> Vec<Alert> {
    let mut out = Vec::new();

    let recent = &aggregates[aggregates.len().saturating_sub(SHIFT_LOOKBACK)..];
    if let [.., prev, latest] = recent {
        if (latest.mean_score - prev.mean_score).abs() > SHIFT_THRESHOLD {
            out.push(Alert::new(
                AlertKind::SentimentShift,
                latest.date,
                format!(
                    "Significant sentiment shift detected: {:.2}",
                    latest.mean_score
                ),
                Some(latest.mean_score),
            ));
        }
    }

    if let Some(a) = crossover(aggregates) {
        out.push(a);
    }
    out
}

/// At most one crossover: ma3 moving above or below ma7 between the last two rows.
fn crossover(aggregates: &[DailyAggregate]) -> Option<Alert> {
    let [.., prev, latest] = aggregates else {
        return None;
    };
    let (Some(ma3), Some(ma7), Some(prev_ma3), Some(prev_ma7)) =
        (latest.ma3, latest.ma7, prev.ma3, prev.ma7)
    else {
        return None;
    };

    if ma3 > ma7 && prev_ma3 <= prev_ma7 {
        Some(Alert::new(
            AlertKind::BullishCrossover,
            latest.date,
            "Short-term sentiment crossing above medium-term".to_string(),
            None,
        ))
    } else if ma3 < ma7 && prev_ma3 >= prev_ma7 {
        Some(Alert::new(
            AlertKind::BearishCrossover,
            latest.date,
            "Short-term sentiment crossing below medium-term".to_string(),
            None,
        ))
    } else {
        None
    }
}

/// Persisted set of acknowledged alert ids.
#[derive(Debug)]
pub struct AlertLedger {
    path: PathBuf,
    acknowledged: BTreeSet<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    acknowledged: BTreeSet<String>,
}

impl AlertLedger {
    /// Open the ledger at `path`; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let acknowledged = match fs::read_to_string(&path) {
            Ok(s) if s.trim().is_empty() => BTreeSet::new(),
            Ok(s) => {
                serde_json::from_str::<LedgerFile>(&s)
                    .map_err(|e| SentimentError::persistence("parse alert ledger", e))?
                    .acknowledged
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(SentimentError::persistence("read alert ledger", e)),
        };
        Ok(Self { path, acknowledged })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_acknowledged(&self, id: &str) -> bool {
        self.acknowledged.contains(id)
    }

    /// Record an acknowledgment. Returns `false` if it was already recorded.
    pub fn acknowledge(&mut self, id: &str) -> Result<bool> {
        if !self.acknowledged.insert(id.to_string()) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            self.acknowledged.remove(id);
            return Err(e);
        }
        Ok(true)
    }

    /// Alerts not yet acknowledged, in input order.
    pub fn unacknowledged(&self, alerts: Vec<Alert>) -> Vec<Alert> {
        alerts
            .into_iter()
            .filter(|a| !self.is_acknowledged(&a.id))
            .collect()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SentimentError::persistence("create ledger dir", e))?;
        }
        let body = serde_json::to_vec_pretty(&LedgerFile {
            acknowledged: self.acknowledged.clone(),
        })
        .map_err(|e| SentimentError::persistence("encode alert ledger", e))?;
        fs::write(&self.path, body)
            .map_err(|e| SentimentError::persistence("write alert ledger", e))
    }
}
