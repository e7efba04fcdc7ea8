//! Feed providers: bounded batches of raw articles for a date range.

pub mod file;
pub mod mediastack;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use crate::article::RawArticle;
use crate::error::Result;

pub use file::FileFeed;
pub use mediastack::MediastackFeed;

/// Inclusive publication-date range requested from a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Yesterday through today (UTC).
    pub fn last_day() -> Self {
        let to = Utc::now().date_naive();
        Self {
            from: to - Duration::days(1),
            to,
        }
    }
}

#[async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch(&self, range: DateRange) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}
