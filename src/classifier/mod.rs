pub mod client;
pub mod config;
pub mod credentials;

pub use client::HuggingFaceClassifier;
pub use config::ClassifierConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One label and its confidence as reported by a text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Output of an external text classifier, shaped `[{label, score}, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifierOutput {
    pub labels: Vec<LabelScore>,
}

impl ClassifierOutput {
    pub fn new(labels: Vec<LabelScore>) -> Self {
        Self { labels }
    }
}

/// A request the classifier refused outright. Sending it again cannot succeed,
/// so it is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierRejected {
    Unauthorized,
    BadRequest(String),
}

impl fmt::Display for ClassifierRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierRejected::Unauthorized => {
                write!(f, "Authentication failed. Check the classifier API token.")
            }
            ClassifierRejected::BadRequest(msg) => write!(f, "Classifier rejected request: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierRejected {}

/// True unless the error is a rejection that would repeat on every attempt.
pub fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ClassifierRejected>().is_none()
}

/// External text classification capability used by the augmented scoring path.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierOutput>;
    fn name(&self) -> &str;
}

/// Convert a classifier output into 0-100 points.
///
/// With `labels` set, the best score among matching labels (case-insensitive)
/// counts. Otherwise the top label counts. None when no label with a finite
/// score qualifies.
pub fn signal_points(output: &ClassifierOutput, labels: Option<&[String]>) -> Option<f64> {
    let best = output
        .labels
        .iter()
        .filter(|entry| match labels {
            Some(wanted) => wanted.iter().any(|l| l.eq_ignore_ascii_case(&entry.label)),
            None => true,
        })
        .map(|entry| entry.score)
        .filter(|score| score.is_finite())
        .fold(None, |acc: Option<f64>, score| {
            Some(acc.map_or(score, |best| best.max(score)))
        });

    best.map(|score| score.clamp(0.0, 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(pairs: &[(&str, f64)]) -> ClassifierOutput {
        ClassifierOutput::new(
            pairs
                .iter()
                .map(|(label, score)| LabelScore {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
        )
    }

    #[test]
    fn test_top_label_when_unfiltered() {
        let out = output(&[("NEG", 0.1), ("POS", 0.8), ("NEU", 0.1)]);
        assert_eq!(signal_points(&out, None).map(|p| p.round()), Some(80.0));
    }

    #[test]
    fn test_filtered_labels() {
        let out = output(&[("NEG", 0.7), ("POS", 0.25)]);
        let wanted = vec!["pos".to_string()];
        assert_eq!(signal_points(&out, Some(wanted.as_slice())), Some(25.0));
    }

    #[test]
    fn test_no_usable_label() {
        let out = output(&[("NEG", 0.7)]);
        let wanted = vec!["algorand".to_string()];
        assert_eq!(signal_points(&out, Some(wanted.as_slice())), None);
        assert_eq!(signal_points(&ClassifierOutput::default(), None), None);
        assert_eq!(signal_points(&output(&[("x", f64::NAN)]), None), None);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        assert_eq!(signal_points(&output(&[("x", 1.7)]), None), Some(100.0));
        assert_eq!(signal_points(&output(&[("x", -0.2), ("y", f64::NAN)]), None), Some(0.0));
    }

    #[test]
    fn test_rejections_are_not_retryable() {
        assert!(!is_retryable(&anyhow::Error::new(ClassifierRejected::Unauthorized)));
        assert!(is_retryable(&anyhow::anyhow!("Classifier rate limit exceeded.")));
        assert_eq!(
            ClassifierRejected::BadRequest("bad inputs".to_string()).to_string(),
            "Classifier rejected request: bad inputs"
        );
    }

    #[test]
    fn test_output_wire_shape() {
        let out: ClassifierOutput =
            serde_json::from_str(r#"[{"label":"POS","score":0.9}]"#).unwrap();
        assert_eq!(out.labels[0].label, "POS");
    }
}
