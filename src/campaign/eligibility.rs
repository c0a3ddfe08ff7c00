use serde::{Deserialize, Serialize};

use super::CampaignRules;
use crate::scoring::Disqualification;

/// Reward eligibility of a scored tweet under its campaign's rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Ineligible { reasons: Vec<IneligibleReason> },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    pub fn summary(&self) -> String {
        match self {
            Eligibility::Eligible => "eligible for rewards".to_string(),
            Eligibility::Ineligible { reasons } => {
                let details: Vec<String> = reasons.iter().map(|r| r.summary()).collect();
                format!("not eligible: {}", details.join("; "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    Disqualified(Disqualification),
    BelowMinimum { required: u8, actual: u8 },
    MissingHashtags(Vec<String>),
}

impl IneligibleReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibleReason::Disqualified(Disqualification::TooShort) => {
                "disqualified as too short".to_string()
            }
            IneligibleReason::Disqualified(Disqualification::Promotional) => {
                "disqualified as promotional".to_string()
            }
            IneligibleReason::BelowMinimum { required, actual } => {
                format!("score {} below campaign minimum {}", actual, required)
            }
            IneligibleReason::MissingHashtags(tags) => {
                format!("missing required hashtags {}", tags.join(", "))
            }
        }
    }
}

/// Apply campaign policy to a finished score. Never changes the score itself.
pub fn assess_eligibility(
    rules: &CampaignRules,
    text: &str,
    final_score: u8,
    disqualification: Option<Disqualification>,
) -> Eligibility {
    let mut reasons = Vec::new();

    if let Some(kind) = disqualification {
        reasons.push(IneligibleReason::Disqualified(kind));
    }

    if let Some(required) = rules.min_score {
        if final_score < required {
            reasons.push(IneligibleReason::BelowMinimum {
                required,
                actual: final_score,
            });
        }
    }

    let missing = rules.missing_hashtags(text);
    if !missing.is_empty() {
        reasons.push(IneligibleReason::MissingHashtags(missing));
    }

    if reasons.is_empty() {
        Eligibility::Eligible
    } else {
        Eligibility::Ineligible { reasons }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(min_score: Option<u8>, tags: &[&str]) -> CampaignRules {
        CampaignRules {
            id: "c1".to_string(),
            required_hashtags: tags.iter().map(|t| t.to_string()).collect(),
            topic: String::new(),
            min_score,
            daily_limit: None,
        }
    }

    #[test]
    fn test_eligible_without_constraints() {
        let result = assess_eligibility(&rules(None, &[]), "anything", 40, None);
        assert!(result.is_eligible());
        assert_eq!(result.summary(), "eligible for rewards");
    }

    #[test]
    fn test_below_minimum() {
        let result = assess_eligibility(&rules(Some(60), &[]), "text", 55, None);
        assert_eq!(
            result,
            Eligibility::Ineligible {
                reasons: vec![IneligibleReason::BelowMinimum {
                    required: 60,
                    actual: 55
                }]
            }
        );
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let result = assess_eligibility(&rules(Some(60), &[]), "text", 60, None);
        assert!(result.is_eligible());
    }

    #[test]
    fn test_reasons_accumulate_in_order() {
        let result = assess_eligibility(
            &rules(Some(50), &["algorand"]),
            "short",
            0,
            Some(Disqualification::TooShort),
        );
        let Eligibility::Ineligible { reasons } = result else {
            panic!("expected ineligible");
        };
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], IneligibleReason::Disqualified(Disqualification::TooShort));
        assert_eq!(
            reasons[2],
            IneligibleReason::MissingHashtags(vec!["#algorand".to_string()])
        );
    }

    #[test]
    fn test_summary_lists_reasons() {
        let result = assess_eligibility(&rules(Some(70), &["#defi"]), "no tags here", 65, None);
        assert_eq!(
            result.summary(),
            "not eligible: score 65 below campaign minimum 70; missing required hashtags #defi"
        );
    }
}
