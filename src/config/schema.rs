use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::campaign::CampaignRules;
use crate::classifier::config::validate_classifier;
use crate::classifier::ClassifierConfig;
use crate::scoring::{validate_scoring, ScoringConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Heuristic scoring settings; defaults apply when absent
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    /// External classifier used by `--classify`
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,

    #[serde(default)]
    pub batch: Option<BatchConfig>,

    #[serde(default)]
    pub campaigns: Vec<CampaignRules>,
}

impl Config {
    pub fn campaign(&self, id: &str) -> Option<&CampaignRules> {
        self.campaigns.iter().find(|c| c.id == id)
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn classifier(&self) -> ClassifierConfig {
        self.classifier.clone().unwrap_or_default()
    }

    pub fn batch(&self) -> BatchConfig {
        self.batch.clone().unwrap_or_default()
    }

    /// Collect every problem in the file rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(errs) = validate_scoring(&self.scoring()) {
            errors.extend(errs);
        }
        if let Err(errs) = validate_classifier(&self.classifier()) {
            errors.extend(errs);
        }

        for (i, campaign) in self.campaigns.iter().enumerate() {
            if campaign.id.trim().is_empty() {
                errors.push(format!("campaigns[{}]: id must not be empty", i));
            } else if self.campaigns[..i].iter().any(|c| c.id == campaign.id) {
                errors.push(format!("campaigns[{}]: duplicate id '{}'", i, campaign.id));
            }
            if let Some(min) = campaign.min_score {
                if min > 100 {
                    errors.push(format!("campaigns[{}]: min_score {} exceeds 100", i, min));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
