use anyhow::{bail, Result};

use super::text::TextStats;

/// Terms that mark a tweet as relevant to the sponsoring ecosystem.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "algorand",
    "@algorand",
    "#algorand",
    "blockchain",
    "cryptocurrency",
    "defi",
    "web3",
    "crypto",
    "pos",
    "pure proof of stake",
    "carbon negative",
    "sustainable blockchain",
    "tps",
    "transactions per second",
    "finality",
    "smart contracts",
    "layer 1",
    "l1",
];

const ANALYSIS_MARKERS: &[&str] = &[
    "analysis",
    "review",
    "thoughts",
    "perspective",
    "opinion",
    "explain",
    "how",
    "why",
    "what",
    "when",
];

const PRONOUN_MARKERS: &[&str] = &["i", "we", "my", "our"];

const OPINION_MARKERS: &[&str] = &[
    "think",
    "believe",
    "feel",
    "consider",
    "in my opinion",
    "from my perspective",
];

const EXPERIENCE_MARKERS: &[&str] = &[
    "tried",
    "used",
    "tested",
    "experienced",
    "learned",
    "discovered",
];

const QUALITY_BASE: u32 = 70;
const QUALITY_WORD_BONUS: u32 = 15;
const QUALITY_SENTENCE_BONUS: u32 = 15;

const ORIGINALITY_BASE: u32 = 60;
const ORIGINALITY_DIGIT_BONUS: u32 = 10;
const ORIGINALITY_QUOTE_BONUS: u32 = 15;
const ORIGINALITY_ANALYSIS_BONUS: u32 = 15;

const AUTHENTICITY_BASE: u32 = 50;
const AUTHENTICITY_PRONOUN_BONUS: u32 = 15;
const AUTHENTICITY_OPINION_BONUS: u32 = 15;
const AUTHENTICITY_EXPERIENCE_BONUS: u32 = 20;

/// Numeric band used for the quality heuristics.
///
/// Accepted forms: `"<N"`, `"<=N"`, `">N"`, `">=N"`, `"N"` and the inclusive
/// range `"N-M"`.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeOp {
    LessThan(f64),
    LessEqual(f64),
    GreaterThan(f64),
    GreaterEqual(f64),
    Equal(f64),
    Between(f64, f64), // Inclusive range: N-M
}

impl RangeOp {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(val) = s.strip_prefix(">=") {
            Ok(RangeOp::GreaterEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix("<=") {
            Ok(RangeOp::LessEqual(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('>') {
            Ok(RangeOp::GreaterThan(val.trim().parse()?))
        } else if let Some(val) = s.strip_prefix('<') {
            Ok(RangeOp::LessThan(val.trim().parse()?))
        } else if s.contains('-') && !s.starts_with('-') {
            let parts: Vec<&str> = s.split('-').collect();
            if parts.len() == 2 {
                let low: f64 = parts[0].trim().parse()?;
                let high: f64 = parts[1].trim().parse()?;
                if low > high {
                    bail!("Range start exceeds end: {}", s)
                }
                Ok(RangeOp::Between(low, high))
            } else {
                bail!("Invalid range format: {}", s)
            }
        } else {
            Ok(RangeOp::Equal(s.parse()?))
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::LessEqual(n) => value <= *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Between(low, high) => value >= *low && value <= *high,
        }
    }
}

/// Share of keywords present in the text, plus the keywords that matched
/// (in keyword-list order).
pub fn relevance(text: &str, keywords: &[String]) -> (u8, Vec<String>) {
    if keywords.is_empty() {
        return (0, Vec::new());
    }

    let lower = text.to_lowercase();
    let matched: Vec<String> = keywords
        .iter()
        .filter(|kw| lower.contains(&kw.to_lowercase()))
        .cloned()
        .collect();

    let ratio = matched.len() as f64 / keywords.len() as f64 * 100.0;
    (ratio.min(100.0).round() as u8, matched)
}

pub fn quality(stats: &TextStats, word_length: &RangeOp, sentence_length: &RangeOp) -> u8 {
    let mut score = QUALITY_BASE;

    if stats.avg_word_length().is_some_and(|avg| word_length.matches(avg)) {
        score += QUALITY_WORD_BONUS;
    }
    if stats
        .avg_sentence_length()
        .is_some_and(|avg| sentence_length.matches(avg))
    {
        score += QUALITY_SENTENCE_BONUS;
    }

    cap(score)
}

/// Fixed baseline plus surface markers; there is no corpus to compare against.
pub fn originality(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score = ORIGINALITY_BASE;

    if text.chars().any(|c| c.is_ascii_digit()) {
        score += ORIGINALITY_DIGIT_BONUS;
    }
    if has_quoted_span(text) {
        score += ORIGINALITY_QUOTE_BONUS;
    }
    if contains_any(&lower, ANALYSIS_MARKERS) {
        score += ORIGINALITY_ANALYSIS_BONUS;
    }

    cap(score)
}

pub fn authenticity(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score = AUTHENTICITY_BASE;

    if has_any_word(&lower, PRONOUN_MARKERS) {
        score += AUTHENTICITY_PRONOUN_BONUS;
    }
    if contains_any(&lower, OPINION_MARKERS) {
        score += AUTHENTICITY_OPINION_BONUS;
    }
    if contains_any(&lower, EXPERIENCE_MARKERS) {
        score += AUTHENTICITY_EXPERIENCE_BONUS;
    }

    cap(score)
}

fn cap(score: u32) -> u8 {
    score.min(100) as u8
}

fn contains_any(lower: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| lower.contains(m))
}

fn has_any_word(lower: &str, words: &[&str]) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

/// True when some pair of double quotes encloses at least one character.
fn has_quoted_span(text: &str) -> bool {
    let quotes: Vec<usize> = text.match_indices('"').map(|(i, _)| i).collect();
    quotes.windows(2).any(|pair| pair[1] > pair[0] + 1)
}
