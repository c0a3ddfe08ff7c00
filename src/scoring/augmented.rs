use std::time::Duration;

use anyhow::Result;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, warn};

use super::config::ScoringConfig;
use super::engine::{
    calculate_score, check_disqualification, disqualified, ScoreResult, ScoreSource,
};
use super::text::TextStats;
use crate::campaign::CampaignRules;
use crate::classifier::{is_retryable, Classifier, ClassifierConfig, ClassifierOutput};
use crate::error::ScoreError;

/// Caller-side limits for one external classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalOptions {
    /// Deadline covering every attempt and backoff delay
    pub timeout: Duration,
    /// Extra attempts after the first failure
    pub retries: usize,
}

impl Default for SignalOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
        }
    }
}

impl SignalOptions {
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            timeout: config.timeout()?,
            retries: config.retries(),
        })
    }
}

/// Ask the classifier for a signal, retrying with backoff inside the deadline.
///
/// Rejected requests are not retried. On timeout the pending call is
/// dropped, which cancels it.
pub async fn fetch_signal<C>(
    classifier: &C,
    text: &str,
    options: &SignalOptions,
) -> Result<ClassifierOutput, ScoreError>
where
    C: Classifier + ?Sized,
{
    let retry_strategy = ExponentialBackoff::from_millis(50)
        .max_delay(Duration::from_secs(2))
        .take(options.retries);

    let attempts = RetryIf::start(
        retry_strategy,
        || classifier.classify(text),
        |e: &anyhow::Error| is_retryable(e),
    );

    match tokio::time::timeout(options.timeout, attempts).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ScoreError::ExternalSignalUnavailable(format!("{:#}", e))),
        Err(_) => Err(ScoreError::ExternalSignalUnavailable(format!(
            "timed out after {}",
            humantime::format_duration(options.timeout)
        ))),
    }
}

/// Score with an external classifier signal, falling back to the heuristic
/// score when the signal is unavailable. Never fails.
pub async fn score_with_classifier<C>(
    text: &str,
    rules: &CampaignRules,
    config: &ScoringConfig,
    classifier: &C,
    options: &SignalOptions,
) -> ScoreResult
where
    C: Classifier + ?Sized,
{
    let stats = TextStats::analyze(text);
    if let Some(kind) = check_disqualification(&stats, config) {
        debug!(?kind, "disqualified before classification");
        return disqualified(kind, text, rules);
    }

    match fetch_signal(classifier, text, options).await {
        Ok(signal) => {
            let result = calculate_score(text, rules, config, Some(&signal));
            if let ScoreSource::Fallback(ref reason) = result.source {
                warn!(
                    classifier = classifier.name(),
                    reason = %reason,
                    "classifier answer not usable, using heuristic score"
                );
            }
            result
        }
        Err(err) => {
            warn!(
                classifier = classifier.name(),
                error = %err,
                "external signal unavailable, using heuristic score"
            );
            let mut result = calculate_score(text, rules, config, None);
            result.source = ScoreSource::Fallback(err.to_string());
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierRejected, LabelScore};
    use crate::scoring::engine::NO_USABLE_LABEL;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    const TWEET: &str = "I think Algorand's pure proof of stake design is genuinely innovative because it achieves fast finality without wasting energy.";

    struct FixedClassifier(f64);

    #[async_trait::async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            Ok(ClassifierOutput::new(vec![LabelScore {
                label: "POS".to_string(),
                score: self.0,
            }]))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[derive(Default)]
    struct FailingClassifier {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Classifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("service down")
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Fails once, then succeeds.
    #[derive(Default)]
    struct FlakyClassifier {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Classifier for FlakyClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("transient")
            }
            Ok(ClassifierOutput::new(vec![LabelScore {
                label: "POS".to_string(),
                score: 1.0,
            }]))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    struct SlowClassifier {
        delay: Duration,
        completed: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl Classifier for SlowClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
            Ok(ClassifierOutput::default())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct EmptyClassifier;

    #[async_trait::async_trait]
    impl Classifier for EmptyClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            Ok(ClassifierOutput::default())
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    #[derive(Default)]
    struct RejectingClassifier {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Classifier for RejectingClassifier {
        async fn classify(&self, _text: &str) -> Result<ClassifierOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClassifierRejected::Unauthorized.into())
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    fn rules() -> CampaignRules {
        CampaignRules {
            id: "algo".to_string(),
            ..CampaignRules::default()
        }
    }

    fn options(timeout_ms: u64, retries: usize) -> SignalOptions {
        SignalOptions {
            timeout: Duration::from_millis(timeout_ms),
            retries,
        }
    }

    #[tokio::test]
    async fn test_signal_augments_score() {
        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &FixedClassifier(0.93),
            &options(1000, 0),
        )
        .await;
        assert_eq!(result.source, ScoreSource::Augmented);
        assert_eq!(result.final_score, 66);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_heuristic() {
        let classifier = FailingClassifier::default();
        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &classifier,
            &options(2000, 1),
        )
        .await;

        let heuristic = calculate_score(TWEET, &rules(), &ScoringConfig::default(), None);
        assert_eq!(result.final_score, heuristic.final_score);
        assert_eq!(result.breakdown, heuristic.breakdown);
        assert!(matches!(result.source, ScoreSource::Fallback(ref reason) if reason.contains("service down")));
        assert!(result.is_heuristic_only());
        // one attempt plus one retry
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let classifier = FlakyClassifier::default();
        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &classifier,
            &options(2000, 1),
        )
        .await;
        assert_eq!(result.source, ScoreSource::Augmented);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_and_cancels_call() {
        let completed = Arc::new(AtomicBool::new(false));
        let classifier = SlowClassifier {
            delay: Duration::from_millis(200),
            completed: completed.clone(),
        };

        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &classifier,
            &options(20, 0),
        )
        .await;
        assert!(matches!(result.source, ScoreSource::Fallback(ref reason) if reason.contains("timed out")));
        assert_eq!(result.final_score, 63);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_answer_falls_back_to_heuristic() {
        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &EmptyClassifier,
            &options(1000, 1),
        )
        .await;
        assert_eq!(result.final_score, 63);
        assert_eq!(result.source, ScoreSource::Fallback(NO_USABLE_LABEL.to_string()));
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let classifier = RejectingClassifier::default();
        let result = score_with_classifier(
            TWEET,
            &rules(),
            &ScoringConfig::default(),
            &classifier,
            &options(2000, 3),
        )
        .await;
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.source, ScoreSource::Fallback(ref reason) if reason.contains("Authentication failed")));
        assert_eq!(result.final_score, 63);
    }

    #[tokio::test]
    async fn test_disqualified_text_skips_classifier() {
        let classifier = FailingClassifier::default();
        let result = score_with_classifier(
            "check this out",
            &rules(),
            &ScoringConfig::default(),
            &classifier,
            &options(1000, 3),
        )
        .await;
        assert_eq!(result.final_score, 0);
        assert_eq!(result.source, ScoreSource::Heuristic);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_signal_error_kind() {
        let err = fetch_signal(&FailingClassifier::default(), TWEET, &options(1000, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ScoreError::ExternalSignalUnavailable(_)));
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let classifier: Box<dyn Classifier> = Box::new(FixedClassifier(0.5));
        let output = fetch_signal(classifier.as_ref(), TWEET, &options(1000, 0))
            .await
            .unwrap();
        assert_eq!(output.labels.len(), 1);
    }

    #[test]
    fn test_options_from_config() {
        let opts = SignalOptions::from_config(&ClassifierConfig::default()).unwrap();
        assert_eq!(opts, options(5000, 1));
        assert_eq!(opts, SignalOptions::default());
    }
}
