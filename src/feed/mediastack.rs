//! Mediastack news API provider.
//!
//! `GET /v1/news?access_key=..&keywords=crypto, bitcoin&languages=en`
//! `&sort=popularity&limit=N&date=from,to`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DateRange, FeedProvider};
use crate::article::RawArticle;
use crate::error::{Result, SentimentError};

pub const DEFAULT_BASE_URL: &str = "http://api.mediastack.com/v1/news";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    data: Vec<RawArticle>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

pub struct MediastackFeed {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    keywords: String,
    languages: String,
    limit: usize,
}

impl MediastackFeed {
    pub fn new(
        api_key: impl Into<String>,
        keywords: impl Into<String>,
        languages: impl Into<String>,
        limit: usize,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SentimentError::Config(
                "MEDIASTACK_API_KEY environment variable is not set".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-sentiment/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            keywords: keywords.into(),
            languages: languages.into(),
            limit,
        })
    }

    /// Point at another endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// reqwest errors echo the request URL, which carries `access_key`.
fn redact(e: reqwest::Error) -> SentimentError {
    SentimentError::Http(e.without_url())
}

#[async_trait]
impl FeedProvider for MediastackFeed {
    async fn fetch(&self, range: DateRange) -> Result<Vec<RawArticle>> {
        let date = format!(
            "{},{}",
            range.from.format("%Y-%m-%d"),
            range.to.format("%Y-%m-%d")
        );
        let limit = self.limit.to_string();
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("keywords", self.keywords.as_str()),
                ("languages", self.languages.as_str()),
                ("sort", "popularity"),
                ("limit", limit.as_str()),
                ("date", date.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(redact)?;

        let body: NewsResponse = resp.json().await.map_err(redact)?;
        if let Some(err) = body.error {
            return Err(SentimentError::Feed(format!("API error: {err}")));
        }
        tracing::info!(target: "ingest", count = body.data.len(), "API returned articles");
        Ok(body.data)
    }

    fn name(&self) -> &'static str {
        "mediastack"
    }
}
