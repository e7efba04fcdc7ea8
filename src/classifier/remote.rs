//! HTTP inference endpoint classifier.
//!
//! Request: `POST {url}` with `{"inputs": "<text>"}` and an optional bearer key.
//! Response: `[{"label": "...", "score": 0.9}, ...]` or the nested
//! `[[{...}]]` form. The highest-scoring label wins.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, Label};
use crate::error::{Result, SentimentError};

const NAME: &str = "remote";

#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(v) => v.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(v) => v,
        }
    }
}

pub struct RemoteClassifier {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl RemoteClassifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("crypto-news-sentiment/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

/// Pick the highest-scoring known label.
pub fn best_label(scores: &[LabelScore]) -> Result<Classification> {
    let best = scores
        .iter()
        .filter(|s| s.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| SentimentError::inference(NAME, "empty label list"))?;
    let label = Label::parse(&best.label)
        .ok_or_else(|| SentimentError::inference(NAME, format!("unknown label {:?}", best.label)))?;
    Ok(Classification::new(label, best.score))
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(SentimentError::inference(NAME, "empty text"));
        }

        #[derive(Serialize)]
        struct Req<'a> {
            inputs: &'a str,
        }

        let mut req = self.http.post(&self.url).json(&Req { inputs: text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SentimentError::inference(NAME, format!("request failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SentimentError::inference(NAME, format!("status {status}")));
        }
        let body: InferenceResponse = resp
            .json()
            .await
            .map_err(|e| SentimentError::inference(NAME, format!("bad response body: {e}")))?;

        best_label(&body.into_scores())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_and_flat_shapes_parse() {
        let nested: InferenceResponse = serde_json::from_str(
            r#"[[{"label":"negative","score":0.2},{"label":"positive","score":0.7}]]"#,
        )
        .unwrap();
        let c = best_label(&nested.into_scores()).unwrap();
        assert_eq!(c.label, Label::Positive);
        assert!((c.confidence - 0.7).abs() < 1e-12);

        let flat: InferenceResponse =
            serde_json::from_str(r#"[{"label":"NEUTRAL","score":0.51}]"#).unwrap();
        assert_eq!(best_label(&flat.into_scores()).unwrap().label, Label::Neutral);
    }

    #[test]
    fn empty_or_unknown_labels_fail() {
        assert!(matches!(
            best_label(&[]),
            Err(SentimentError::Inference { .. })
        ));
        let unknown = vec![LabelScore {
            label: "sarcastic".into(),
            score: 0.9,
        }];
        assert!(best_label(&unknown).is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_inference_error() {
        let timeout = Duration::from_millis(300);
        let c = RemoteClassifier::new("http://127.0.0.1:9/classify", None, timeout).unwrap();
        let err = c.classify("Bitcoin rallies").await.unwrap_err();
        assert!(matches!(err, SentimentError::Inference { classifier: "remote", .. }));
    }
}
