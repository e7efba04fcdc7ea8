//! Classifier abstraction: `classify(text) -> {label, confidence}`.
//!
//! The fusion engine treats classifiers as black boxes. A local polarity
//! model and a remote HTTP inference endpoint are provided; tests plug in
//! their own implementations.

pub mod polarity;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use polarity::PolarityClassifier;
pub use remote::RemoteClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    /// Signed base value: positive +1, negative -1, neutral 0.
    pub fn sign(self) -> f64 {
        match self {
            Label::Positive => 1.0,
            Label::Negative => -1.0,
            Label::Neutral => 0.0,
        }
    }

    /// Lenient mapping of model label strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_2" | "bullish" => Some(Label::Positive),
            "negative" | "neg" | "label_0" | "bearish" => Some(Label::Negative),
            "neutral" | "neu" | "label_1" => Some(Label::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

impl Classification {
    pub fn new(label: Label, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { label, confidence }
    }

    /// `sign(label) * confidence`.
    pub fn signed(&self) -> f64 {
        self.label.sign() * self.confidence
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `text`. Fails with `SentimentError::Inference` when no result
    /// can be produced (empty text, transport failure, unknown label).
    async fn classify(&self, text: &str) -> Result<Classification>;
    /// Name for diagnostics/logs.
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

/// Which classifier backs a role (primary or verifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Local polarity model with negation and intensifier handling.
    #[default]
    Polarity,
    /// Local polarity model reading the text as a plain bag of words.
    PolarityPlain,
    /// HTTP inference endpoint.
    Remote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_sign_and_parse() {
        assert_eq!(Label::Positive.sign(), 1.0);
        assert_eq!(Label::Negative.sign(), -1.0);
        assert_eq!(Label::Neutral.sign(), 0.0);
        assert_eq!(Label::parse(" POSITIVE "), Some(Label::Positive));
        assert_eq!(Label::parse("LABEL_0"), Some(Label::Negative));
        assert_eq!(Label::parse("meh"), None);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Classification::new(Label::Negative, 1.7).signed(), -1.0);
        assert_eq!(Classification::new(Label::Positive, f64::NAN).confidence, 0.0);
        assert_eq!(Classification::new(Label::Neutral, 0.9).signed(), 0.0);
    }
}
