//! Application configuration.
//!
//! Resolution order:
//! 1) `$SENTIMENT_CONFIG_PATH` (must exist)
//! 2) `config/app.toml`
//! 3) built-in defaults
//!
//! Secrets never come from the file: `MEDIASTACK_API_KEY` and
//! `CLASSIFIER_API_KEY` are read from the environment.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::aggregate::WindowMode;
use crate::classifier::{ClassifierKind, DynClassifier, PolarityClassifier, RemoteClassifier};
use crate::dedup::DEFAULT_BATCH_CAP;
use crate::fusion::FusionEngine;
use crate::lexicon::Lexicon;

pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_MEDIASTACK_KEY: &str = "MEDIASTACK_API_KEY";
pub const ENV_CLASSIFIER_KEY: &str = "CLASSIFIER_API_KEY";
const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub corpus_path: PathBuf,
    pub lexicon_path: PathBuf,
    pub alert_ack_path: PathBuf,
    /// Optional JSON file of raw articles used instead of the Mediastack API.
    pub feed_file: Option<PathBuf>,
    pub batch_cap: usize,
    pub fetch_limit: usize,
    pub keywords: String,
    pub languages: String,
    pub interval_secs: u64,
    pub bind_addr: String,
    pub window_mode: WindowMode,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub primary: ClassifierKind,
    pub verifier: ClassifierKind,
    pub remote_url: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            primary: ClassifierKind::Polarity,
            verifier: ClassifierKind::PolarityPlain,
            remote_url: None,
            timeout_ms: 10_000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/sentiment_scores.jsonl"),
            lexicon_path: PathBuf::from("config/lexicon.json"),
            alert_ack_path: PathBuf::from("state/alert_acks.json"),
            feed_file: None,
            batch_cap: DEFAULT_BATCH_CAP,
            fetch_limit: 10,
            keywords: "crypto, bitcoin".to_string(),
            languages: "en".to_string(),
            interval_secs: 12 * 3600,
            bind_addr: "127.0.0.1:8000".to_string(),
            window_mode: WindowMode::Rows,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Env var path, then `config/app.toml`, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from_file(&pb);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from_file(&default);
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.batch_cap == 0 {
            bail!("batch_cap must be at least 1");
        }
        if self.interval_secs == 0 {
            bail!("interval_secs must be at least 1");
        }
        let needs_remote = self.classifier.primary == ClassifierKind::Remote
            || self.classifier.verifier == ClassifierKind::Remote;
        if needs_remote && self.classifier.remote_url.is_none() {
            bail!("classifier.remote_url is required when a remote classifier is selected");
        }
        Ok(())
    }

    /// Lexicon from `lexicon_path`, or the built-in seed when the file is absent.
    pub fn load_lexicon(&self) -> Result<Lexicon> {
        Lexicon::load_or_seed(&self.lexicon_path).map_err(|e| anyhow!(e))
    }

    /// Fusion engine wired per the classifier section.
    pub fn build_engine(&self, lexicon: Arc<Lexicon>) -> Result<FusionEngine> {
        let primary = self.build_classifier(self.classifier.primary)?;
        let verifier = self.build_classifier(self.classifier.verifier)?;
        tracing::info!(
            primary = primary.name(),
            verifier = verifier.name(),
            lexicon_words = lexicon.len(),
            "fusion engine ready"
        );
        Ok(FusionEngine::new(primary, verifier, lexicon))
    }

    fn build_classifier(&self, kind: ClassifierKind) -> Result<DynClassifier> {
        Ok(match kind {
            ClassifierKind::Polarity => Arc::new(PolarityClassifier::new()),
            ClassifierKind::PolarityPlain => Arc::new(PolarityClassifier::plain()),
            ClassifierKind::Remote => {
                let url = self
                    .classifier
                    .remote_url
                    .clone()
                    .ok_or_else(|| anyhow!("classifier.remote_url is not set"))?;
                let key = std::env::var(ENV_CLASSIFIER_KEY).ok();
                Arc::new(RemoteClassifier::new(
                    url,
                    key,
                    Duration::from_millis(self.classifier.timeout_ms),
                )?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = AppConfig::parse(
            r#"
            batch_cap = 3
            window_mode = "calendar_days"

            [classifier]
            verifier = "polarity"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.batch_cap, 3);
        assert_eq!(cfg.window_mode, WindowMode::CalendarDays);
        assert_eq!(cfg.classifier.verifier, ClassifierKind::Polarity);
        assert_eq!(cfg.fetch_limit, 10);
        assert_eq!(cfg.keywords, "crypto, bitcoin");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::parse("batch_cap = 0").is_err());
        assert!(AppConfig::parse("unknown_key = 1").is_err());
        assert!(AppConfig::parse("[classifier]\nprimary = \"remote\"").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_takes_precedence() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("app.toml");
        fs::write(&p, "fetch_limit = 25").unwrap();

        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let cfg = AppConfig::load_default().unwrap();
        assert_eq!(cfg.fetch_limit, 25);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(AppConfig::load_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);
    }
}
