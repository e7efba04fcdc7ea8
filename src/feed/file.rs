//! Feed backed by a JSON array of raw articles on disk (offline runs, fixtures).

use std::path::PathBuf;

use async_trait::async_trait;

use super::{DateRange, FeedProvider};
use crate::article::RawArticle;
use crate::error::{Result, SentimentError};

#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedProvider for FileFeed {
    /// Returns every record in the file; the range is not applied.
    async fn fetch(&self, _range: DateRange) -> Result<Vec<RawArticle>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SentimentError::Feed(format!("reading {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| SentimentError::Feed(format!("parsing {}: {e}", self.path.display())))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
