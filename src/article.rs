//! Article records: raw feed shape, validated `Article`, identity key and the
//! persisted `ScoredArticle` row.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::normalize::{normalize, normalize_opt, strip_markup};

/// Untyped record as delivered by a feed. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Validated article. Title and url are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub published_at: DateTime<FixedOffset>,
}

impl Article {
    /// Calendar day of publication, in the timestamp's own offset.
    pub fn date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(&self.title, &self.url)
    }

    /// Normalized title + description used for classification.
    /// Falls back to the title alone when the description is absent or blank.
    pub fn analysis_text(&self) -> String {
        let title = normalize(&strip_markup(&self.title));
        let desc = self.description.as_deref().map(strip_markup);
        let desc = normalize_opt(desc.as_deref());
        if desc.is_empty() {
            title
        } else if title.is_empty() {
            desc
        } else {
            format!("{title} {desc}")
        }
    }
}

impl TryFrom<RawArticle> for Article {
    type Error = SentimentError;

    fn try_from(raw: RawArticle) -> Result<Self> {
        let title = required(raw.title, "title")?;
        let url = required(raw.url, "url")?;
        let published_raw = required(raw.published_at, "published_at")?;
        let published_at = parse_timestamp(&published_raw)?;
        let description = raw
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            title,
            description,
            url,
            published_at,
        })
    }
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    match field.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(SentimentError::MalformedArticle(format!("missing {name}"))),
    }
}

/// Parse ISO-8601: RFC 3339 first, then a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(SentimentError::MalformedArticle(format!(
        "unparseable published_at {s:?}"
    )))
}

/// Identity used for deduplication: lower-cased, trimmed `(title, url)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleKey {
    title: String,
    url: String,
}

impl ArticleKey {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            url: url.trim().to_lowercase(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// One corpus row: the article identity, its day and the fused score in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub date: NaiveDate,
    pub title: String,
    pub url: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScoredArticle {
    pub fn from_article(article: &Article, score: f64) -> Self {
        Self {
            date: article.date(),
            title: article.title.clone(),
            url: article.url.clone(),
            score: score.clamp(-1.0, 1.0),
            description: article.description.clone(),
        }
    }

    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(&self.title, &self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, url: &str, ts: &str) -> RawArticle {
        RawArticle {
            title: Some(title.into()),
            description: None,
            url: Some(url.into()),
            source: None,
            published_at: Some(ts.into()),
        }
    }

    #[test]
    fn valid_article_parses_and_trims() {
        let a = Article::try_from(raw(
            "  Bitcoin rallies ",
            " https://x.test/a ",
            "2024-11-07T10:00:00+00:00",
        ))
        .unwrap();
        assert_eq!(a.title, "Bitcoin rallies");
        assert_eq!(a.url, "https://x.test/a");
        assert_eq!(a.date(), NaiveDate::from_ymd_opt(2024, 11, 7).unwrap());
    }

    #[test]
    fn date_uses_the_timestamp_offset() {
        let a = Article::try_from(raw("t", "u", "2024-11-07T23:30:00-05:00")).unwrap();
        assert_eq!(a.date(), NaiveDate::from_ymd_opt(2024, 11, 7).unwrap());
    }

    #[test]
    fn naive_timestamp_is_utc() {
        let a = Article::try_from(raw("t", "u", "2024-11-07T08:15:00")).unwrap();
        assert_eq!(a.published_at.offset().local_minus_utc(), 0);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let mut r = raw("t", "u", "2024-11-07T08:15:00Z");
        r.url = Some("   ".into());
        assert!(matches!(
            Article::try_from(r),
            Err(SentimentError::MalformedArticle(_))
        ));
        assert!(matches!(
            Article::try_from(raw("", "u", "2024-11-07T08:15:00Z")),
            Err(SentimentError::MalformedArticle(_))
        ));
        assert!(matches!(
            Article::try_from(raw("t", "u", "yesterday")),
            Err(SentimentError::MalformedArticle(_))
        ));
    }

    #[test]
    fn key_is_case_and_space_insensitive() {
        assert_eq!(
            ArticleKey::new(" ETF Approved", "HTTPS://X.test/A "),
            ArticleKey::new("etf approved", "https://x.test/a")
        );
    }

    #[test]
    fn analysis_text_falls_back_to_title() {
        let mut a = Article::try_from(raw("Bitcoin: up!", "u", "2024-11-07T08:15:00Z")).unwrap();
        assert_eq!(a.analysis_text(), "Bitcoin up!");
        a.description = Some("Strong <b>inflows</b>".into());
        assert_eq!(a.analysis_text(), "Bitcoin up! Strong inflows");
    }
}
