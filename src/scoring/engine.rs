use serde::{Deserialize, Serialize};
use tracing::warn;

use super::config::{
    ScoringConfig, DEFAULT_FEEDBACK_THRESHOLD, DEFAULT_MIN_WORDS, DEFAULT_SIGNAL_WEIGHT,
};
use super::factors::{self, RangeOp, DEFAULT_KEYWORDS};
use super::text::TextStats;
use crate::campaign::{assess_eligibility, CampaignRules, Eligibility};
use crate::classifier::{signal_points, ClassifierOutput};
use crate::error::ScoreError;
use crate::submission::TweetSubmission;

pub const TOO_SHORT_FEEDBACK: &str = "Tweet is too short. Please provide more meaningful content.";
pub const PROMOTIONAL_FEEDBACK: &str =
    "Too many hashtags, URLs, or mentions. This appears to be promotional content.";

/// Fallback reason when a classifier answered without a label that counts.
pub const NO_USABLE_LABEL: &str = "no usable label";

const RELEVANCE_FEEDBACK: &str =
    "Try including more Algorand-specific content and technical details.";
const QUALITY_FEEDBACK: &str =
    "Consider writing longer, more detailed content with proper sentence structure.";
const ORIGINALITY_FEEDBACK: &str =
    "Make your content more unique by adding personal insights or analysis.";
const AUTHENTICITY_FEEDBACK: &str =
    "Share your personal experience or perspective to make the content more authentic.";

/// Short-circuit outcomes that bypass the weighted combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disqualification {
    TooShort,
    Promotional,
}

impl Disqualification {
    pub fn final_score(self) -> u8 {
        match self {
            Disqualification::TooShort => 0,
            Disqualification::Promotional => 10,
        }
    }

    pub fn breakdown(self) -> ScoreBreakdown {
        match self {
            Disqualification::TooShort => ScoreBreakdown {
                relevance: 0,
                quality: 0,
                originality: 0,
                authenticity: 0,
                spam_probability: 100,
            },
            Disqualification::Promotional => ScoreBreakdown {
                relevance: 30,
                quality: 10,
                originality: 20,
                authenticity: 10,
                spam_probability: 90,
            },
        }
    }

    pub fn feedback(self) -> &'static str {
        match self {
            Disqualification::TooShort => TOO_SHORT_FEEDBACK,
            Disqualification::Promotional => PROMOTIONAL_FEEDBACK,
        }
    }
}

/// Sub-scores, each an integer in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub relevance: u8,
    pub quality: u8,
    pub originality: u8,
    pub authenticity: u8,
    /// Derived from the final score, not an input to it
    pub spam_probability: u8,
}

/// Where the final score came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Heuristics only, no classifier involved
    Heuristic,
    /// Heuristics blended with an external classifier signal
    Augmented,
    /// A classifier was requested but unavailable or gave no usable label;
    /// heuristics only
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub final_score: u8,
    pub breakdown: ScoreBreakdown,
    pub feedback: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub disqualification: Option<Disqualification>,
    pub source: ScoreSource,
    pub eligibility: Eligibility,
}

impl ScoreResult {
    /// True unless an external signal contributed to the score
    pub fn is_heuristic_only(&self) -> bool {
        !matches!(self.source, ScoreSource::Augmented)
    }
}

/// Step 1: the first matching disqualification rule, if any.
pub fn check_disqualification(
    stats: &TextStats,
    config: &ScoringConfig,
) -> Option<Disqualification> {
    let min_words = config.min_words.unwrap_or(DEFAULT_MIN_WORDS);
    if stats.word_count < min_words {
        return Some(Disqualification::TooShort);
    }

    let limits = config.spam.unwrap_or_default();
    if stats.hashtag_count > limits.max_hashtags
        || stats.url_count > limits.max_urls
        || stats.mention_count > limits.max_mentions
    {
        return Some(Disqualification::Promotional);
    }

    None
}

/// Score a tweet's text against its campaign.
///
/// Pure and deterministic for a given `signal`. A signal is ignored for
/// disqualified text. A signal without a usable label is not blended and the
/// result is marked as a fallback.
pub fn calculate_score(
    text: &str,
    rules: &CampaignRules,
    config: &ScoringConfig,
    signal: Option<&ClassifierOutput>,
) -> ScoreResult {
    let stats = TextStats::analyze(text);

    if let Some(kind) = check_disqualification(&stats, config) {
        return disqualified(kind, text, rules);
    }

    let default_keywords: Vec<String>;
    let keywords: &[String] = match config.keywords {
        Some(ref k) => k,
        None => {
            default_keywords = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
            &default_keywords
        }
    };

    let word_band = band(config.word_length.as_deref(), RangeOp::Between(4.0, 8.0));
    let sentence_band = band(config.sentence_length.as_deref(), RangeOp::Between(5.0, 20.0));

    let (relevance, matched_keywords) = factors::relevance(text, keywords);
    let quality = factors::quality(&stats, &word_band, &sentence_band);
    let originality = factors::originality(text);
    let authenticity = factors::authenticity(text);

    let weights = config.weights.unwrap_or_default();
    let heuristic = weights.relevance * f64::from(relevance)
        + weights.quality * f64::from(quality)
        + weights.originality * f64::from(originality)
        + weights.authenticity * f64::from(authenticity);

    let points = signal.map(|output| signal_points(output, config.signal_labels.as_deref()));
    let (combined, source) = match points {
        Some(Some(points)) => {
            let weight = config
                .signal_weight
                .unwrap_or(DEFAULT_SIGNAL_WEIGHT)
                .clamp(0.0, 1.0);
            (
                heuristic * (1.0 - weight) + points * weight,
                ScoreSource::Augmented,
            )
        }
        Some(None) => (heuristic, ScoreSource::Fallback(NO_USABLE_LABEL.to_string())),
        None => (heuristic, ScoreSource::Heuristic),
    };

    let final_score = to_score(combined);
    let breakdown = ScoreBreakdown {
        relevance,
        quality,
        originality,
        authenticity,
        spam_probability: 100 - final_score,
    };

    let threshold = config.feedback_threshold.unwrap_or(DEFAULT_FEEDBACK_THRESHOLD);
    let feedback = build_feedback(&breakdown, &matched_keywords, threshold);

    ScoreResult {
        final_score,
        breakdown,
        feedback,
        matched_keywords,
        disqualification: None,
        source,
        eligibility: assess_eligibility(rules, text, final_score, None),
    }
}

/// Score a stored submission. Fails with InvalidInput, without scoring, when
/// the submission has no text or belongs to a different campaign.
pub fn score_submission(
    submission: &TweetSubmission,
    rules: &CampaignRules,
    config: &ScoringConfig,
    signal: Option<&ClassifierOutput>,
) -> Result<ScoreResult, ScoreError> {
    let text = submission.text()?;
    if submission.campaign != rules.id {
        return Err(ScoreError::InvalidInput(format!(
            "submission {} belongs to campaign {}, not {}",
            submission.id, submission.campaign, rules.id
        )));
    }
    Ok(calculate_score(text, rules, config, signal))
}

pub(crate) fn disqualified(
    kind: Disqualification,
    text: &str,
    rules: &CampaignRules,
) -> ScoreResult {
    let final_score = kind.final_score();
    ScoreResult {
        final_score,
        breakdown: kind.breakdown(),
        feedback: vec![kind.feedback().to_string()],
        matched_keywords: Vec::new(),
        disqualification: Some(kind),
        source: ScoreSource::Heuristic,
        eligibility: assess_eligibility(rules, text, final_score, Some(kind)),
    }
}

/// One message per weak sub-score in fixed order, then matched keywords.
fn build_feedback(
    breakdown: &ScoreBreakdown,
    matched_keywords: &[String],
    threshold: u8,
) -> Vec<String> {
    let checks = [
        (breakdown.relevance, RELEVANCE_FEEDBACK),
        (breakdown.quality, QUALITY_FEEDBACK),
        (breakdown.originality, ORIGINALITY_FEEDBACK),
        (breakdown.authenticity, AUTHENTICITY_FEEDBACK),
    ];

    let mut feedback: Vec<String> = checks
        .iter()
        .filter(|(score, _)| *score < threshold)
        .map(|(_, message)| message.to_string())
        .collect();

    if !matched_keywords.is_empty() {
        feedback.push(format!(
            "Good use of relevant terms: {}",
            matched_keywords.join(", ")
        ));
    }

    feedback
}

fn band(value: Option<&str>, fallback: RangeOp) -> RangeOp {
    match value.map(RangeOp::parse) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            warn!(band = value.unwrap_or_default(), error = %e, "invalid band, using default");
            fallback
        }
        None => fallback,
    }
}

fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
