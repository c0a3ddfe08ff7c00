use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// A tweet submitted to a campaign. Immutable once created.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TweetSubmission {
    pub id: String,
    #[serde(alias = "userId")]
    pub user: String,
    #[serde(alias = "campaignId")]
    pub campaign: String,
    /// Raw tweet text; absent or null text cannot be scored
    #[serde(default, alias = "content")]
    pub text: Option<String>,
    #[serde(alias = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
}

impl TweetSubmission {
    /// The text to score, or InvalidInput when the submission carries none
    pub fn text(&self) -> Result<&str, ScoreError> {
        self.text.as_deref().ok_or_else(|| {
            ScoreError::InvalidInput(format!("submission {} has no text", self.id))
        })
    }

    /// UTC calendar day the submission belongs to
    pub fn submitted_on(&self) -> NaiveDate {
        self.submitted_at.date_naive()
    }
}
