use serde::{Deserialize, Serialize};

use super::factors::DEFAULT_KEYWORDS;

pub const DEFAULT_MIN_WORDS: usize = 10;
pub const DEFAULT_WORD_LENGTH: &str = "4-8";
pub const DEFAULT_SENTENCE_LENGTH: &str = "5-20";
pub const DEFAULT_FEEDBACK_THRESHOLD: u8 = 50;
pub const DEFAULT_SIGNAL_WEIGHT: f64 = 0.1;

/// Main scoring configuration.
///
/// Every field is optional; missing fields fall back to the canonical rules.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   min_words: 10
///   spam: { max_hashtags: 5, max_urls: 2, max_mentions: 3 }
///   weights: { relevance: 0.3, quality: 0.3, originality: 0.2, authenticity: 0.2 }
///   word_length: "4-8"
///   sentence_length: "5-20"
///   signal_weight: 0.1
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Tweets with fewer whitespace-separated words are disqualified
    #[serde(default)]
    pub min_words: Option<usize>,

    /// Counts above these limits mark the tweet as promotional
    #[serde(default)]
    pub spam: Option<SpamLimits>,

    /// Weights of the four heuristic sub-scores (must sum to 1.0)
    #[serde(default)]
    pub weights: Option<Weights>,

    /// Domain keywords counted towards relevance
    #[serde(default)]
    pub keywords: Option<Vec<String>>,

    /// Average word length band that earns the quality bonus.
    /// A band that does not parse is logged and replaced by the default;
    /// `validate_scoring` reports it as an error.
    #[serde(default)]
    pub word_length: Option<String>,

    /// Average words-per-sentence band that earns the quality bonus.
    /// Same fallback as `word_length`.
    #[serde(default)]
    pub sentence_length: Option<String>,

    /// Sub-scores below this value produce an improvement message
    #[serde(default)]
    pub feedback_threshold: Option<u8>,

    /// Share of the final score taken from the external classifier signal
    #[serde(default)]
    pub signal_weight: Option<f64>,

    /// Classifier labels that count as a positive signal.
    /// When unset, the top-scoring label is used.
    #[serde(default)]
    pub signal_labels: Option<Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_words: Some(DEFAULT_MIN_WORDS),
            spam: Some(SpamLimits::default()),
            weights: Some(Weights::default()),
            keywords: Some(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()),
            word_length: Some(DEFAULT_WORD_LENGTH.to_string()),
            sentence_length: Some(DEFAULT_SENTENCE_LENGTH.to_string()),
            feedback_threshold: Some(DEFAULT_FEEDBACK_THRESHOLD),
            signal_weight: Some(DEFAULT_SIGNAL_WEIGHT),
            signal_labels: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpamLimits {
    pub max_hashtags: usize,
    pub max_urls: usize,
    pub max_mentions: usize,
}

impl Default for SpamLimits {
    fn default() -> Self {
        Self {
            max_hashtags: 5,
            max_urls: 2,
            max_mentions: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub relevance: f64,
    pub quality: f64,
    pub originality: f64,
    pub authenticity: f64,
}

impl Weights {
    pub fn total(&self) -> f64 {
        self.relevance + self.quality + self.originality + self.authenticity
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            relevance: 0.3,
            quality: 0.3,
            originality: 0.2,
            authenticity: 0.2,
        }
    }
}
