//! # Domain Lexicon
//!
//! Static mapping from lower-case crypto-market words to signed weights,
//! applied additively on top of the primary classifier. Loaded once per
//! process and shared read-only (`Arc<Lexicon>`).
//!
//! JSON shape: `{ "rally": 0.3, "hack": -0.5 }`

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use crate::error::{Result, SentimentError};

#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    weights: HashMap<String, f64>,
}

impl Lexicon {
    /// Keys are trimmed and lower-cased. When two keys fold to the same word,
    /// the later entry wins.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = HashMap::new();
        for (raw, v) in entries {
            let w = raw.as_ref().trim().to_lowercase();
            if w.is_empty() || !v.is_finite() {
                continue;
            }
            if let Some(prev) = weights.insert(w, v) {
                tracing::warn!(
                    word = raw.as_ref().trim(),
                    replaced = prev,
                    weight = v,
                    "lexicon key differs only in case; later entry wins"
                );
            }
        }
        Self { weights }
    }

    pub fn empty() -> Self {
        Self {
            weights: HashMap::new(),
        }
    }

    /// Load from a JSON file. Keys are lower-cased; non-finite weights dropped.
    /// Keys are applied in byte order, so among case variants the last one
    /// sorted wins (`"pump"` over `"Pump"`).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            SentimentError::Config(format!("reading lexicon {}: {e}", path.display()))
        })?;
        let map: BTreeMap<String, f64> = serde_json::from_str(&raw).map_err(|e| {
            SentimentError::Config(format!("parsing lexicon {}: {e}", path.display()))
        })?;
        Ok(Self::new(map))
    }

    /// Load from `path` if it exists, otherwise use the built-in seed.
    pub fn load_or_seed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(path = %path.display(), "lexicon file not found, using built-in seed");
            Ok(Self::default_seed())
        }
    }

    pub fn weight(&self, word: &str) -> Option<f64> {
        self.weights.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of weights over every whole-word, case-insensitive match in `text`.
    /// Repeated words count once per occurrence.
    pub fn score(&self, text: &str) -> f64 {
        tokenize(text).filter_map(|t| self.weight(&t)).sum()
    }

    /// Built-in crypto-market seed, small nudges relative to the classifier.
    pub fn default_seed() -> Self {
        Self::new([
            ("bullish", 0.3),
            ("rally", 0.2),
            ("rallies", 0.2),
            ("surge", 0.2),
            ("surges", 0.2),
            ("soar", 0.2),
            ("soars", 0.2),
            ("adoption", 0.15),
            ("approval", 0.15),
            ("approved", 0.15),
            ("inflows", 0.15),
            ("breakout", 0.15),
            ("partnership", 0.1),
            ("upgrade", 0.1),
            ("halving", 0.1),
            ("record", 0.1),
            ("bearish", -0.3),
            ("crash", -0.3),
            ("crashes", -0.3),
            ("plunge", -0.25),
            ("plunges", -0.25),
            ("hack", -0.3),
            ("hacked", -0.3),
            ("exploit", -0.25),
            ("scam", -0.3),
            ("fraud", -0.3),
            ("lawsuit", -0.2),
            ("ban", -0.2),
            ("banned", -0.2),
            ("outflows", -0.15),
            ("liquidation", -0.15),
            ("liquidations", -0.15),
            ("selloff", -0.2),
            ("bankruptcy", -0.3),
        ])
    }
}

/// Lower-case alphanumeric tokens.
pub(crate) fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}
