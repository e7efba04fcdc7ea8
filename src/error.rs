//! Error taxonomy for the sentiment pipeline.
//!
//! Per-article errors (`Inference`, `MalformedArticle`) are isolated by the
//! ingestion cycle; per-cycle errors (`Persistence`, `Feed`) abort it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// A classifier could not produce a result for the given text.
    #[error("inference failed ({classifier}): {reason}")]
    Inference {
        classifier: &'static str,
        reason: String,
    },

    /// Fewer than two aggregate rows exist.
    #[error("insufficient history: {rows} aggregate row(s), need at least 2")]
    InsufficientHistory { rows: usize },

    /// A required article field is missing or unparseable.
    #[error("malformed article: {0}")]
    MalformedArticle(String),

    /// Corpus read/append or lock acquisition failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("feed error: {0}")]
    Feed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl SentimentError {
    pub fn inference(classifier: &'static str, reason: impl Into<String>) -> Self {
        Self::Inference {
            classifier,
            reason: reason.into(),
        }
    }

    pub fn persistence(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Persistence(format!("{context}: {err}"))
    }

    /// True for errors that only affect a single article.
    pub fn is_per_article(&self) -> bool {
        matches!(self, Self::Inference { .. } | Self::MalformedArticle(_))
    }
}

pub type Result<T, E = SentimentError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_article_classification() {
        assert!(SentimentError::inference("polarity", "empty text").is_per_article());
        assert!(SentimentError::MalformedArticle("missing url".into()).is_per_article());
        assert!(!SentimentError::Persistence("disk full".into()).is_per_article());
        assert!(!SentimentError::InsufficientHistory { rows: 1 }.is_per_article());
    }

    #[test]
    fn messages_carry_context() {
        let e = SentimentError::inference("remote", "timeout");
        assert_eq!(e.to_string(), "inference failed (remote): timeout");
        let e = SentimentError::persistence("rename corpus", "permission denied");
        assert_eq!(
            e.to_string(),
            "persistence error: rename corpus: permission denied"
        );
    }
}
