use super::config::ScoringConfig;
use super::factors::RangeOp;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.min_words == Some(0) {
        errors.push("scoring.min_words: must be at least 1".to_string());
    }

    if let Some(weights) = config.weights {
        let named = [
            ("relevance", weights.relevance),
            ("quality", weights.quality),
            ("originality", weights.originality),
            ("authenticity", weights.authenticity),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!(
                    "scoring.weights.{}: must be between 0 and 1, got {}",
                    name, value
                ));
            }
        }
        if (weights.total() - 1.0).abs() > WEIGHT_TOLERANCE {
            errors.push(format!(
                "scoring.weights: must sum to 1.0, got {}",
                weights.total()
            ));
        }
    }

    if let Some(ref keywords) = config.keywords {
        if keywords.is_empty() {
            errors.push("scoring.keywords: must not be empty".to_string());
        }
        for (i, keyword) in keywords.iter().enumerate() {
            if keyword.trim().is_empty() {
                errors.push(format!("scoring.keywords[{}]: must not be blank", i));
            }
        }
    }

    if let Some(ref band) = config.word_length {
        if let Err(e) = RangeOp::parse(band) {
            errors.push(format!(
                "scoring.word_length: invalid '{}' - {}",
                band, e
            ));
        }
    }

    if let Some(ref band) = config.sentence_length {
        if let Err(e) = RangeOp::parse(band) {
            errors.push(format!(
                "scoring.sentence_length: invalid '{}' - {}",
                band, e
            ));
        }
    }

    if let Some(threshold) = config.feedback_threshold {
        if threshold > 100 {
            errors.push("scoring.feedback_threshold: must be at most 100".to_string());
        }
    }

    if let Some(weight) = config.signal_weight {
        if !(0.0..=1.0).contains(&weight) {
            errors.push(format!(
                "scoring.signal_weight: must be between 0 and 1, got {}",
                weight
            ));
        }
    }

    if let Some(ref labels) = config.signal_labels {
        if labels.is_empty() {
            errors.push("scoring.signal_labels: must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
