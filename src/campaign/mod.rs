mod eligibility;

pub use eligibility::{assess_eligibility, Eligibility, IneligibleReason};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rules a sponsoring campaign attaches to its submissions.
///
/// Read-only to the scoring engine. `topic` is descriptive only and never
/// matched against tweet text.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CampaignRules {
    pub id: String,

    /// Hashtags every submission must carry. The leading `#` is optional here
    /// but required in the tweet.
    #[serde(default, alias = "requiredHashtags")]
    pub required_hashtags: Vec<String>,

    #[serde(default)]
    pub topic: String,

    /// Minimum final score for reward eligibility
    #[serde(default, alias = "minScore")]
    pub min_score: Option<u8>,

    /// Submissions per user per day that can earn points
    #[serde(default, alias = "dailyLimit")]
    pub daily_limit: Option<u32>,
}

impl CampaignRules {
    /// Required hashtags absent from `text`, rendered with their `#`, in rule order.
    pub fn missing_hashtags(&self, text: &str) -> Vec<String> {
        let present = hashtags_in(text);
        self.required_hashtags
            .iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty() && !present.contains(tag))
            .map(|tag| format!("#{}", tag))
            .collect()
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_lowercase()
}

/// Lowercased hashtag bodies found in `text`. A hashtag body runs over
/// alphanumerics and underscores following a `#`.
pub fn hashtags_in(text: &str) -> HashSet<String> {
    text.split('#')
        .skip(1)
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|tag| !tag.is_empty())
        .collect()
}
