//! # Sentiment Fusion Engine
//! Combines a primary classifier, the domain lexicon and a verification
//! classifier into one calibrated score in [-1, 1] per article.
//!
//! Steps:
//! 1. analysis text = normalized title + description
//! 2. `base = sign(label) * confidence` from the primary classifier
//! 3. `lexicon` = sum of matched lexicon weights
//! 4. `combined = base + lexicon`
//! 5. `combined < -0.7` → ask the verifier; a positive answer halves `combined`
//! 6. compression by the magnitude of `combined` before damping:
//!    `>= 0.8` → ×0.8, `>= 0.5` → ×0.9
//! 7. clamp to [-1, 1]
//!
//! Both classifier calls fail the article, never the batch.

use std::sync::Arc;

use serde::Serialize;

use crate::article::Article;
use crate::classifier::{Classification, DynClassifier, Label};
use crate::error::{Result, SentimentError};
use crate::lexicon::Lexicon;

/// Combined readings below this trigger the verification pass.
pub const VERIFY_THRESHOLD: f64 = -0.7;
/// Applied to a strong negative the verifier reads as positive.
pub const DAMPING_FACTOR: f64 = 0.5;

/// `(min magnitude, factor)`, checked in order.
const COMPRESSION_BANDS: &[(f64, f64)] = &[(0.8, 0.8), (0.5, 0.9)];

/// Factor for a pre-damping magnitude.
pub fn compression_factor(magnitude: f64) -> f64 {
    COMPRESSION_BANDS
        .iter()
        .find(|(min, _)| magnitude >= *min)
        .map(|(_, f)| *f)
        .unwrap_or(1.0)
}

/// Outcome of the verification pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// `combined` was not a strong negative.
    NotNeeded,
    /// Verifier agreed (negative or neutral).
    Confirmed(Label),
    /// Verifier returned positive; the reading was damped.
    Disputed,
    /// Strong negative, but no verifier output was supplied.
    Unverified,
}

/// Explainable breakdown of one fused score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedScore {
    pub primary: Classification,
    pub base_score: f64,
    pub lexicon_score: f64,
    pub combined: f64,
    pub verification: Verification,
    /// Final score in [-1, 1].
    pub score: f64,
}

/// Steps 6–7: compress by the pre-damping magnitude, apply damping, clamp.
pub fn calibrate(combined: f64, damped: bool) -> f64 {
    let factor = compression_factor(combined.abs());
    let value = if damped {
        combined * DAMPING_FACTOR
    } else {
        combined
    };
    (value * factor).clamp(-1.0, 1.0)
}

/// Pure fusion given the classifier outputs. `verifier` is consulted only
/// when `combined` falls below [`VERIFY_THRESHOLD`].
pub fn fuse(
    primary: Classification,
    lexicon_score: f64,
    verifier: Option<Classification>,
) -> FusedScore {
    let base_score = primary.signed();
    let lexicon_score = if lexicon_score.is_finite() {
        lexicon_score
    } else {
        0.0
    };
    let combined = base_score + lexicon_score;

    let verification = if combined < VERIFY_THRESHOLD {
        match verifier {
            Some(v) if v.label == Label::Positive => Verification::Disputed,
            Some(v) => Verification::Confirmed(v.label),
            None => Verification::Unverified,
        }
    } else {
        Verification::NotNeeded
    };

    let score = calibrate(combined, verification == Verification::Disputed);

    FusedScore {
        primary,
        base_score,
        lexicon_score,
        combined,
        verification,
        score,
    }
}

/// Fusion engine bound to its classifiers and the process-wide lexicon.
#[derive(Clone)]
pub struct FusionEngine {
    primary: DynClassifier,
    verifier: DynClassifier,
    lexicon: Arc<Lexicon>,
}

impl FusionEngine {
    pub fn new(primary: DynClassifier, verifier: DynClassifier, lexicon: Arc<Lexicon>) -> Self {
        Self {
            primary,
            verifier,
            lexicon,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Score one article. Fails with `Inference` when the analysis text is
    /// empty or either classifier call fails.
    pub async fn score(&self, article: &Article) -> Result<FusedScore> {
        let text = article.analysis_text();
        self.score_text(&text).await
    }

    pub async fn score_text(&self, text: &str) -> Result<FusedScore> {
        if text.trim().is_empty() {
            return Err(SentimentError::inference(
                self.primary.name(),
                "empty analysis text",
            ));
        }

        let primary = self.primary.classify(text).await?;
        let lexicon_score = self.lexicon.score(text);
        let combined = primary.signed() + lexicon_score;

        // Verification is sequenced after the primary + lexicon combination.
        let verifier = if combined < VERIFY_THRESHOLD {
            let v = self.verifier.classify(text).await?;
            tracing::debug!(
                target: "fusion",
                combined,
                verifier = self.verifier.name(),
                label = ?v.label,
                "strong negative verified"
            );
            Some(v)
        } else {
            None
        };

        Ok(fuse(primary, lexicon_score, verifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(label: Label, conf: f64) -> Classification {
        Classification::new(label, conf)
    }

    #[test]
    fn disputed_strong_negative_is_damped_then_compressed() {
        let f = fuse(
            c(Label::Negative, 0.9),
            0.0,
            Some(c(Label::Positive, 0.6)),
        );
        assert_eq!(f.verification, Verification::Disputed);
        assert!((f.score - (-0.36)).abs() < 1e-12, "got {}", f.score);
    }

    #[test]
    fn confirmed_strong_negative_is_only_compressed() {
        let f = fuse(c(Label::Negative, 0.9), 0.0, Some(c(Label::Negative, 0.8)));
        assert_eq!(f.verification, Verification::Confirmed(Label::Negative));
        assert!((f.score - (-0.72)).abs() < 1e-12);
    }

    #[test]
    fn verification_threshold_is_strict() {
        let f = fuse(c(Label::Negative, 0.7), 0.0, Some(c(Label::Positive, 1.0)));
        assert_eq!(f.verification, Verification::NotNeeded);
        assert!((f.score - (-0.63)).abs() < 1e-12);
    }

    #[test]
    fn positive_extremes_are_never_verified() {
        let f = fuse(c(Label::Positive, 1.0), 0.5, Some(c(Label::Negative, 1.0)));
        assert_eq!(f.verification, Verification::NotNeeded);
        assert!((f.combined - 1.5).abs() < 1e-12);
        assert_eq!(f.score, 1.0);
    }

    #[test]
    fn compression_bands() {
        assert_eq!(compression_factor(0.49), 1.0);
        assert_eq!(compression_factor(0.5), 0.9);
        assert_eq!(compression_factor(0.79), 0.9);
        assert_eq!(compression_factor(0.8), 0.8);
        assert!((calibrate(0.3, false) - 0.3).abs() < 1e-12);
        assert!((calibrate(-0.6, false) - (-0.54)).abs() < 1e-12);
    }

    #[test]
    fn lexicon_nudges_combined() {
        let f = fuse(c(Label::Neutral, 0.4), -0.25, None);
        assert!((f.base_score).abs() < 1e-12);
        assert!((f.score - (-0.25)).abs() < 1e-12);
    }
}
