//! Local polarity classifier.
//!
//! Polarity is the mean of the polarities of matched words. A negator within
//! the last `negation_window` tokens flips a word (scaled by -0.5); an
//! intensifier directly before a word scales it. The label follows the
//! polarity: > 0.1 positive, < -0.1 negative, otherwise neutral, and the
//! confidence is `|polarity|`.

use async_trait::async_trait;

use super::{Classification, Classifier, Label};
use crate::error::{Result, SentimentError};
use crate::lexicon::tokenize;

/// Polarity magnitude separating neutral from a directional label.
pub const LABEL_THRESHOLD: f64 = 0.1;

const NEGATION_FACTOR: f64 = -0.5;

/// General-purpose word polarities in [-1, 1].
const POLARITY: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("positive", 0.23),
    ("strong", 0.43),
    ("stronger", 0.43),
    ("gain", 0.4),
    ("gains", 0.4),
    ("rise", 0.3),
    ("rises", 0.3),
    ("rising", 0.3),
    ("up", 0.1),
    ("higher", 0.25),
    ("high", 0.16),
    ("record", 0.3),
    ("win", 0.8),
    ("success", 0.3),
    ("successful", 0.75),
    ("optimistic", 0.5),
    ("optimism", 0.5),
    ("confident", 0.5),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("recover", 0.3),
    ("recovery", 0.3),
    ("surge", 0.5),
    ("surges", 0.5),
    ("soar", 0.6),
    ("soars", 0.6),
    ("rally", 0.5),
    ("rallies", 0.5),
    ("best", 1.0),
    ("new", 0.14),
    ("easy", 0.43),
    ("safe", 0.5),
    ("secure", 0.4),
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("negative", -0.3),
    ("weak", -0.38),
    ("weaker", -0.38),
    ("loss", -0.5),
    ("losses", -0.5),
    ("lose", -0.5),
    ("fall", -0.3),
    ("falls", -0.3),
    ("falling", -0.3),
    ("drop", -0.3),
    ("drops", -0.3),
    ("down", -0.16),
    ("lower", -0.2),
    ("low", -0.2),
    ("fear", -0.5),
    ("fears", -0.5),
    ("panic", -0.6),
    ("risk", -0.3),
    ("risky", -0.5),
    ("crash", -0.7),
    ("crashes", -0.7),
    ("plunge", -0.6),
    ("plunges", -0.6),
    ("collapse", -0.7),
    ("fraud", -0.8),
    ("scam", -0.8),
    ("hack", -0.6),
    ("hacked", -0.6),
    ("stolen", -0.6),
    ("terrible", -1.0),
    ("fail", -0.5),
    ("failed", -0.5),
    ("failure", -0.5),
    ("warning", -0.4),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("volatile", -0.2),
    ("uncertain", -0.3),
    ("uncertainty", -0.3),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("really", 1.2),
    ("highly", 1.3),
    ("massive", 1.4),
    ("huge", 1.3),
    ("slightly", 0.5),
    ("somewhat", 0.7),
];

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn" | "wasn" | "aren" | "cannot" | "without" | "nor"
    )
}

fn word_polarity(w: &str) -> Option<f64> {
    POLARITY.iter().find(|(k, _)| *k == w).map(|(_, v)| *v)
}

fn intensity(w: &str) -> Option<f64> {
    INTENSIFIERS.iter().find(|(k, _)| *k == w).map(|(_, v)| *v)
}

#[derive(Debug, Clone)]
pub struct PolarityClassifier {
    negation_window: usize,
    intensifiers: bool,
    name: &'static str,
}

impl Default for PolarityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityClassifier {
    /// Negation window of 3 tokens, intensifiers on.
    pub fn new() -> Self {
        Self {
            negation_window: 3,
            intensifiers: true,
            name: "polarity",
        }
    }

    /// Bag-of-words reading: no negation, no intensifiers.
    pub fn plain() -> Self {
        Self {
            negation_window: 0,
            intensifiers: false,
            name: "polarity-plain",
        }
    }

    /// Mean polarity in [-1, 1], or `None` when `text` has no tokens.
    pub fn polarity(&self, text: &str) -> Option<f64> {
        let tokens: Vec<String> = tokenize(text).collect();
        if tokens.is_empty() {
            return None;
        }

        let mut sum = 0.0;
        let mut n = 0usize;
        for (i, tok) in tokens.iter().enumerate() {
            let Some(base) = word_polarity(tok) else {
                continue;
            };
            let mut p = base;
            if self.intensifiers && i > 0 {
                if let Some(m) = intensity(&tokens[i - 1]) {
                    p *= m;
                }
            }
            let negated = (1..=self.negation_window).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                p *= NEGATION_FACTOR;
            }
            sum += p.clamp(-1.0, 1.0);
            n += 1;
        }

        if n == 0 {
            Some(0.0)
        } else {
            Some((sum / n as f64).clamp(-1.0, 1.0))
        }
    }
}

/// Label for a polarity value.
pub fn label_for(polarity: f64) -> Label {
    if polarity > LABEL_THRESHOLD {
        Label::Positive
    } else if polarity < -LABEL_THRESHOLD {
        Label::Negative
    } else {
        Label::Neutral
    }
}

#[async_trait]
impl Classifier for PolarityClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let p = self
            .polarity(text)
            .ok_or_else(|| SentimentError::inference(self.name, "no tokens in text"))?;
        Ok(Classification::new(label_for(p), p.abs()))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
