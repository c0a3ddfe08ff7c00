use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::config::ClassifierConfig;
use super::credentials::get_api_key_from_env;
use super::{Classifier, ClassifierOutput, ClassifierRejected, LabelScore};

/// Text classifier backed by the hosted Hugging Face inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceClassifier {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

/// The inference API answers text classification with either a nested or a
/// flat label list, and with `{"error": ...}` while a model is loading.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

impl HuggingFaceClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let timeout = config.timeout()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("tweet-score")
            .build()
            .context("Failed to create classifier HTTP client")?;

        Ok(Self {
            client,
            url: config.model_url(),
            model: config.model().to_string(),
            api_key: get_api_key_from_env(config.api_key_env()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait::async_trait]
impl Classifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierOutput> {
        let mut request = self.client.post(&self.url).json(&json!({ "inputs": text }));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach classifier {}", self.model))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read classifier response")?;

        if !status.is_success() {
            return Err(status_error(status, &body, &self.model));
        }

        parse_response(&body)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Map a failed HTTP status to an error. Rejections are tagged so callers
/// skip retrying them.
fn status_error(status: reqwest::StatusCode, body: &str, model: &str) -> anyhow::Error {
    match status.as_u16() {
        401 | 403 => ClassifierRejected::Unauthorized.into(),
        408 | 429 => anyhow!("Classifier rate limit exceeded or request timed out ({}).", status),
        503 => anyhow!("Model {} is loading or unavailable.", model),
        400..=499 => ClassifierRejected::BadRequest(format!("{} {}", status, body.trim())).into(),
        _ => anyhow!("Classifier API error {}: {}", status, body.trim()),
    }
}

fn parse_response(body: &str) -> Result<ClassifierOutput> {
    let parsed: InferenceResponse =
        serde_json::from_str(body).context("Failed to parse classifier response JSON")?;

    match parsed {
        InferenceResponse::Nested(batches) => Ok(ClassifierOutput::new(
            batches.into_iter().next().unwrap_or_default(),
        )),
        InferenceResponse::Flat(labels) => Ok(ClassifierOutput::new(labels)),
        InferenceResponse::Error { error } => Err(anyhow!("Classifier error: {}", error)),
    }
}
