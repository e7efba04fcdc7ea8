//! # Temporal Aggregator
//! Groups the corpus by calendar date and derives 3- and 7-window trailing
//! moving averages of the daily mean. Pure and deterministic: the same
//! corpus always yields the same rows, so it is recomputed on every read.
//!
//! Window modes:
//! - `Rows` (default): windows span consecutive aggregate rows; days without
//!   articles are skipped, not counted as zero.
//! - `CalendarDays`: windows span the trailing N calendar days; missing days
//!   are left out of the mean and the value is undefined until N calendar
//!   days of history exist.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::article::ScoredArticle;

pub const SHORT_WINDOW: usize = 3;
pub const MEDIUM_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    #[default]
    Rows,
    CalendarDays,
}

/// One calendar date's mean sentiment plus its rolling averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub mean_score: f64,
    /// Undefined (`None`) until the window has enough history.
    pub ma3: Option<f64>,
    pub ma7: Option<f64>,
    pub article_count: usize,
}

/// Aggregate with the default row-based windows.
pub fn aggregate(corpus: &[ScoredArticle]) -> Vec<DailyAggregate> {
    aggregate_with(corpus, WindowMode::Rows)
}

pub fn aggregate_with(corpus: &[ScoredArticle], mode: WindowMode) -> Vec<DailyAggregate> {
    // BTreeMap keeps dates strictly increasing and unique.
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for row in corpus {
        let e = days.entry(row.date).or_insert((0.0, 0));
        e.0 += row.score;
        e.1 += 1;
    }

    let daily: Vec<(NaiveDate, f64, usize)> = days
        .into_iter()
        .map(|(d, (sum, n))| (d, sum / n as f64, n))
        .collect();

    let (ma3, ma7) = match mode {
        WindowMode::Rows => (
            rolling_rows(&daily, SHORT_WINDOW),
            rolling_rows(&daily, MEDIUM_WINDOW),
        ),
        WindowMode::CalendarDays => (
            rolling_calendar(&daily, SHORT_WINDOW),
            rolling_calendar(&daily, MEDIUM_WINDOW),
        ),
    };

    daily
        .into_iter()
        .zip(ma3.into_iter().zip(ma7))
        .map(|((date, mean_score, article_count), (ma3, ma7))| DailyAggregate {
            date,
            mean_score,
            ma3,
            ma7,
            article_count,
        })
        .collect()
}

/// Trailing simple moving average over `window` rows; leading rows are `None`.
fn rolling_rows(daily: &[(NaiveDate, f64, usize)], window: usize) -> Vec<Option<f64>> {
    (0..daily.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice = &daily[i + 1 - window..=i];
            Some(slice.iter().map(|(_, m, _)| m).sum::<f64>() / window as f64)
        })
        .collect()
}

/// Mean over rows dated within `(date - window, date]`.
fn rolling_calendar(daily: &[(NaiveDate, f64, usize)], window: usize) -> Vec<Option<f64>> {
    let Some(first) = daily.first().map(|(d, _, _)| *d) else {
        return Vec::new();
    };
    let span = window as i64 - 1;

    daily
        .iter()
        .enumerate()
        .map(|(i, (date, _, _))| {
            if window == 0 || (*date - first).num_days() < span {
                return None;
            }
            let in_window: Vec<f64> = daily[..=i]
                .iter()
                .rev()
                .take_while(|(d, _, _)| (*date - *d).num_days() <= span)
                .map(|(_, m, _)| *m)
                .collect();
            Some(in_window.iter().sum::<f64>() / in_window.len() as f64)
        })
        .collect()
}
