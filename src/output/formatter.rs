use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::error::ScoreError;
use crate::rewards::DailyTally;
use crate::scoring::{ScoreResult, ScoreSource};
use crate::submission::TweetSubmission;

/// Tweet text is cut to this many characters in tables.
const TEXT_WIDTH: usize = 60;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Score with a trailing asterisk when a requested classifier was unavailable
pub fn format_score(result: &ScoreResult) -> String {
    match result.source {
        ScoreSource::Fallback(_) => format!("{}*", result.final_score),
        _ => result.final_score.to_string(),
    }
}

fn paint_score(score: u8, text: &str, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match score {
        70..=100 => text.green().bold().to_string(),
        40..=69 => text.yellow().bold().to_string(),
        _ => text.red().bold().to_string(),
    }
}

/// Multi-line report for a single scored tweet
pub fn format_result(result: &ScoreResult, use_colors: bool) -> String {
    let b = &result.breakdown;
    let score = paint_score(result.final_score, &format_score(result), use_colors);

    let mut lines = vec![
        format!("Score: {}/100", score),
        format!("  Relevance:    {:>3}", b.relevance),
        format!("  Quality:      {:>3}", b.quality),
        format!("  Originality:  {:>3}", b.originality),
        format!("  Authenticity: {:>3}", b.authenticity),
        format!("  Spam:         {:>3}%", b.spam_probability),
    ];

    if !result.matched_keywords.is_empty() {
        lines.push(format!("  Keywords: {}", result.matched_keywords.join(", ")));
    }

    match result.source {
        ScoreSource::Heuristic => {}
        ScoreSource::Augmented => lines.push("  Signal: external classifier".to_string()),
        ScoreSource::Fallback(ref reason) => {
            lines.push(format!("  Signal: unavailable ({})", reason))
        }
    }

    let eligibility = result.eligibility.summary();
    lines.push(if use_colors {
        if result.eligibility.is_eligible() {
            format!("  {}", eligibility.green())
        } else {
            format!("  {}", eligibility.red())
        }
    } else {
        format!("  {}", eligibility)
    });

    for tip in &result.feedback {
        if use_colors {
            lines.push(format!("  - {}", tip.dimmed()));
        } else {
            lines.push(format!("  - {}", tip));
        }
    }

    lines.join("\n")
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = flat.chars().collect();
    if chars.len() <= max_width {
        flat
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Leaderboard: index, score, user, eligibility mark, tweet text
pub fn format_ranked_table(ranked: &[(&TweetSubmission, &ScoreResult)], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No scored submissions.".to_string();
    }

    ranked
        .iter()
        .enumerate()
        .map(|(idx, (submission, result))| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>4}", format_score(result));
            let mark = if result.eligibility.is_eligible() { "+" } else { "-" };
            let text = truncate_text(submission.text.as_deref().unwrap_or_default(), TEXT_WIDTH);

            if use_colors {
                format!(
                    "{} {}  {} {}  {}",
                    index_str.dimmed(),
                    paint_score(result.final_score, &score_padded, true),
                    mark,
                    submission.user.yellow(),
                    text
                )
            } else {
                format!(
                    "{} {}  {} {}  {}",
                    index_str, score_padded, mark, submission.user, text
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per (user, campaign, day)
pub fn format_tallies(tallies: &[DailyTally], use_colors: bool) -> String {
    if tallies.is_empty() {
        return "No rewards to tally.".to_string();
    }

    tallies
        .iter()
        .map(|t| {
            let points = format!("{} pts", t.points);
            let counts = format!("({}/{} rewarded)", t.rewarded, t.submissions);
            if use_colors {
                format!(
                    "{}  {}  {}  {} {}",
                    t.date,
                    t.campaign.cyan(),
                    t.user.yellow(),
                    points.bold(),
                    counts.dimmed()
                )
            } else {
                format!("{}  {}  {}  {} {}", t.date, t.campaign, t.user, points, counts)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-submission failures from a batch
pub fn format_failures(failures: &[(String, &ScoreError)], use_colors: bool) -> String {
    failures
        .iter()
        .map(|(id, err)| {
            if use_colors {
                format!("{} {}: {}", "skipped".red(), id, err)
            } else {
                format!("skipped {}: {}", id, err)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::CampaignRules;
    use crate::scoring::{calculate_score, ScoringConfig};
    use chrono::{NaiveDate, TimeZone, Utc};

    const GOOD: &str = "I think Algorand's pure proof of stake design is genuinely innovative because it achieves fast finality without wasting energy.";

    fn scored(text: &str) -> ScoreResult {
        calculate_score(text, &CampaignRules::default(), &ScoringConfig::default(), None)
    }

    fn submission(user: &str, text: &str) -> TweetSubmission {
        TweetSubmission {
            id: "t1".to_string(),
            user: user.to_string(),
            campaign: "algo".to_string(),
            text: Some(text.to_string()),
            submitted_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_result_plain() {
        let output = format_result(&scored(GOOD), false);
        assert!(output.starts_with("Score: 63/100"));
        assert!(output.contains("Relevance:     17"));
        assert!(output.contains("Spam:          37%"));
        assert!(output.contains("Keywords: algorand, pure proof of stake, finality"));
        assert!(output.contains("eligible for rewards"));
        assert!(!output.contains("Signal:"));
    }

    #[test]
    fn test_format_result_fallback_marked() {
        let mut result = scored(GOOD);
        result.source = ScoreSource::Fallback("timed out after 5s".to_string());
        let output = format_result(&result, false);
        assert!(output.starts_with("Score: 63*/100"));
        assert!(output.contains("Signal: unavailable (timed out after 5s)"));
    }

    #[test]
    fn test_format_result_disqualified() {
        let output = format_result(&scored("gm frens"), false);
        assert!(output.starts_with("Score: 0/100"));
        assert!(output.contains("not eligible: disqualified as too short"));
        assert!(output.contains("- Tweet is too short."));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Short text", 20), "Short text");
        assert_eq!(truncate_text("This is a very long title", 15), "This is a ve...");
        assert_eq!(truncate_text("line\nbreaks   collapse", 30), "line breaks collapse");
        assert_eq!(truncate_text("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_ranked_table() {
        let good = submission("alice", GOOD);
        let short = submission("bob", "gm");
        let good_result = scored(GOOD);
        let short_result = scored("gm");

        let table = format_ranked_table(&[(&good, &good_result), (&short, &short_result)], false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1.   63  + alice  I think Algorand"));
        assert!(lines[0].ends_with("..."));
        assert!(lines[1].starts_with(" 2.    0  - bob  gm"));
    }

    #[test]
    fn test_format_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No scored submissions.");
    }

    #[test]
    fn test_format_tallies() {
        let tallies = vec![DailyTally {
            user: "alice".to_string(),
            campaign: "algo".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            submissions: 3,
            rewarded: 2,
            points: 120,
        }];
        assert_eq!(
            format_tallies(&tallies, false),
            "2024-05-01  algo  alice  120 pts (2/3 rewarded)"
        );
        assert_eq!(format_tallies(&[], false), "No rewards to tally.");
    }

    #[test]
    fn test_format_failures() {
        let err = ScoreError::InvalidInput("submission t9 has no text".to_string());
        let output = format_failures(&[("t9".to_string(), &err)], false);
        assert_eq!(output, "skipped t9: Invalid input: submission t9 has no text");
    }
}
