use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::batch::{BatchOutcome, CampaignBook};
use crate::scoring::ScoreResult;
use crate::submission::TweetSubmission;

/// Points earned by one user in one campaign on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTally {
    pub user: String,
    pub campaign: String,
    pub date: NaiveDate,
    /// Scored submissions that day
    pub submissions: u32,
    /// Submissions that earned points
    pub rewarded: u32,
    pub points: u32,
}

type TallyKey = (String, String, NaiveDate);

/// Group scored outcomes by (user, campaign, day) and award points.
///
/// Only the first `daily_limit` submissions of a day, by time, can earn
/// points; within those, only eligible ones do. Outcomes that failed to score
/// are not counted. Tallies are ordered by user, campaign, then date.
pub fn daily_tallies(outcomes: &[BatchOutcome], campaigns: &CampaignBook) -> Vec<DailyTally> {
    let mut groups: BTreeMap<TallyKey, Vec<(&TweetSubmission, &ScoreResult)>> = BTreeMap::new();

    for outcome in outcomes {
        if let Ok(ref result) = outcome.result {
            let s = &outcome.submission;
            groups
                .entry((s.user.clone(), s.campaign.clone(), s.submitted_on()))
                .or_default()
                .push((s, result));
        }
    }

    groups
        .into_iter()
        .map(|((user, campaign, date), mut scored)| {
            scored.sort_by_key(|(s, _)| s.submitted_at);

            let limit = campaigns
                .get(&campaign)
                .and_then(|rules| rules.daily_limit)
                .map(|l| l as usize)
                .unwrap_or(usize::MAX);

            let earning: Vec<_> = scored
                .iter()
                .take(limit)
                .filter(|(_, r)| r.eligibility.is_eligible())
                .collect();

            DailyTally {
                submissions: scored.len() as u32,
                rewarded: earning.len() as u32,
                points: earning.iter().map(|(_, r)| u32::from(r.final_score)).sum(),
                user,
                campaign,
                date,
            }
        })
        .collect()
}
