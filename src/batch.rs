use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::campaign::CampaignRules;
use crate::classifier::Classifier;
use crate::error::ScoreError;
use crate::scoring::{
    calculate_score, score_with_classifier, ScoreResult, ScoringConfig, SignalOptions,
};
use crate::submission::TweetSubmission;

pub const DEFAULT_CONCURRENCY: usize = 8;

/// Background rescoring settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum submissions scored at once
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl BatchConfig {
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }
}

/// Campaign rules keyed by campaign id, shared read-only across tasks.
pub type CampaignBook = HashMap<String, Arc<CampaignRules>>;

pub fn campaign_book(campaigns: &[CampaignRules]) -> CampaignBook {
    campaigns
        .iter()
        .map(|rules| (rules.id.clone(), Arc::new(rules.clone())))
        .collect()
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub submission: TweetSubmission,
    pub result: Result<ScoreResult, ScoreError>,
}

/// Parse JSON-lines submissions. Blank lines are skipped; a line that does
/// not parse becomes an InvalidInput error tagged with its line number.
pub fn parse_submissions(content: &str) -> Vec<Result<TweetSubmission, ScoreError>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| ScoreError::InvalidInput(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

/// Score every submission with at most `concurrency` in flight.
///
/// Each task owns its submission and a handle to its campaign rules, so a
/// score is always computed from one snapshot. Outcomes come back in input
/// order; per-item failures do not affect siblings.
pub async fn score_batch(
    submissions: Vec<TweetSubmission>,
    campaigns: &CampaignBook,
    config: &ScoringConfig,
    classifier: Option<&dyn Classifier>,
    options: &SignalOptions,
    concurrency: usize,
) -> Vec<BatchOutcome> {
    let max_in_flight = concurrency.max(1);
    let total = submissions.len();

    let mut futures = FuturesUnordered::new();
    let mut pending = submissions.into_iter().enumerate();
    let mut scored = Vec::with_capacity(total);

    // Fill initial batch
    for _ in 0..max_in_flight {
        if let Some((index, submission)) = pending.next() {
            let rules = campaigns.get(&submission.campaign).cloned();
            futures.push(score_one(index, submission, rules, config, classifier, options));
        }
    }

    // Process results and feed new tasks
    while let Some(outcome) = futures.next().await {
        scored.push(outcome);

        if let Some((index, submission)) = pending.next() {
            let rules = campaigns.get(&submission.campaign).cloned();
            futures.push(score_one(index, submission, rules, config, classifier, options));
        }
    }

    scored.sort_by_key(|(index, _)| *index);
    debug!(total, "batch scoring finished");
    scored.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn score_one(
    index: usize,
    submission: TweetSubmission,
    rules: Option<Arc<CampaignRules>>,
    config: &ScoringConfig,
    classifier: Option<&dyn Classifier>,
    options: &SignalOptions,
) -> (usize, BatchOutcome) {
    let result = match (submission.text(), rules) {
        (Err(e), _) => Err(e),
        (Ok(_), None) => Err(ScoreError::InvalidInput(format!(
            "submission {} references unknown campaign {}",
            submission.id, submission.campaign
        ))),
        (Ok(text), Some(rules)) => Ok(match classifier {
            Some(c) => score_with_classifier(text, &rules, config, c, options).await,
            None => calculate_score(text, &rules, config, None),
        }),
    };

    match result {
        Ok(ref r) => debug!(id = %submission.id, score = r.final_score, "scored submission"),
        Err(ref e) => debug!(id = %submission.id, error = %e, "submission not scored"),
    }

    (index, BatchOutcome { submission, result })
}

/// Leaderboard order: score descending, earlier submission first on ties.
/// Failed outcomes are left out.
pub fn rank(outcomes: &[BatchOutcome]) -> Vec<(&TweetSubmission, &ScoreResult)> {
    let mut ranked: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|r| (&o.submission, r)))
        .collect();

    ranked.sort_by(|a, b| {
        b.1.final_score
            .cmp(&a.1.final_score)
            .then_with(|| a.0.submitted_at.cmp(&b.0.submitted_at))
    });
    ranked
}
