use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "finiteautomata/bertweet-base-sentiment-analysis";
pub const DEFAULT_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";
pub const DEFAULT_TIMEOUT: &str = "5s";
pub const DEFAULT_RETRIES: usize = 1;

/// Connection settings for the external text classifier.
///
/// Passed explicitly to the classifier adapter; nothing here is read from
/// global state except the API key, looked up by variable name when the
/// client is built.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Base URL of the inference API (the model id is appended)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    /// Environment variable holding the API token
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Overall deadline for one classification, e.g. "5s" or "750ms"
    #[serde(default)]
    pub timeout: Option<String>,

    /// Extra attempts after a failed call, before falling back to heuristics
    #[serde(default)]
    pub retries: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
            retries: Some(DEFAULT_RETRIES),
        }
    }
}

impl ClassifierConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    pub fn retries(&self) -> usize {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }

    pub fn timeout(&self) -> Result<Duration> {
        let raw = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        humantime::parse_duration(raw.trim())
            .with_context(|| format!("Invalid classifier timeout '{}'", raw))
    }

    /// Full model URL, e.g. `https://api-inference.huggingface.co/models/<model>`
    pub fn model_url(&self) -> String {
        let endpoint = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        format!("{}/{}", endpoint.trim_end_matches('/'), self.model())
    }
}

/// Validate classifier configuration at startup, collecting every error.
pub fn validate_classifier(config: &ClassifierConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref endpoint) = config.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(format!(
                "classifier.endpoint: must be an http(s) URL, got '{}'",
                endpoint
            ));
        }
    }

    if config.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
        errors.push("classifier.model: must not be blank".to_string());
    }

    if config
        .api_key_env
        .as_deref()
        .is_some_and(|v| v.trim().is_empty())
    {
        errors.push("classifier.api_key_env: must not be blank".to_string());
    }

    match config.timeout() {
        Ok(d) if d.is_zero() => {
            errors.push("classifier.timeout: must be greater than zero".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!("classifier.timeout: {}", e)),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(5));
        assert_eq!(config.retries(), 1);
        assert_eq!(
            config.model_url(),
            "https://api-inference.huggingface.co/models/finiteautomata/bertweet-base-sentiment-analysis"
        );
        assert!(validate_classifier(&config).is_ok());
    }

    #[test]
    fn test_partial_parse_falls_back() {
        let yaml = r#"
endpoint: "http://localhost:8080/"
timeout: "750ms"
"#;
        let config: ClassifierConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.timeout().unwrap(), Duration::from_millis(750));
        assert_eq!(config.api_key_env(), "HUGGINGFACE_API_KEY");
        assert_eq!(
            config.model_url(),
            "http://localhost:8080/finiteautomata/bertweet-base-sentiment-analysis"
        );
    }

    #[test]
    fn test_validation_collects_errors() {
        let config = ClassifierConfig {
            endpoint: Some("ftp://nope".to_string()),
            model: Some(" ".to_string()),
            api_key_env: None,
            timeout: Some("soon".to_string()),
            retries: None,
        };
        let errors = validate_classifier(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("classifier.endpoint"));
        assert!(errors[2].starts_with("classifier.timeout"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ClassifierConfig {
            timeout: Some("0s".to_string()),
            ..ClassifierConfig::default()
        };
        assert!(validate_classifier(&config).is_err());
    }
}
