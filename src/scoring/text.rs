/// Structural counts over a tweet's raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStats {
    pub word_count: usize,
    /// Characters across all words, whitespace excluded
    pub word_chars: usize,
    pub sentence_count: usize,
    pub hashtag_count: usize,
    pub url_count: usize,
    pub mention_count: usize,
}

impl TextStats {
    pub fn analyze(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_chars = words.iter().map(|w| w.chars().count()).sum();

        Self {
            word_count: words.len(),
            word_chars,
            sentence_count: count_sentences(text),
            hashtag_count: text.matches('#').count(),
            url_count: words.iter().filter(|w| contains_url(w)).count(),
            mention_count: text.matches('@').count(),
        }
    }

    /// Average characters per word, None for empty text
    pub fn avg_word_length(&self) -> Option<f64> {
        if self.word_count == 0 {
            None
        } else {
            Some(self.word_chars as f64 / self.word_count as f64)
        }
    }

    /// Average words per sentence, None when no sentence has content
    pub fn avg_sentence_length(&self) -> Option<f64> {
        if self.sentence_count == 0 {
            None
        } else {
            Some(self.word_count as f64 / self.sentence_count as f64)
        }
    }
}

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// A URL runs from its scheme to the next whitespace, so one whitespace token
/// holds at most one. The scheme must be followed by at least one character.
fn contains_url(token: &str) -> bool {
    let start = [token.find("http://"), token.find("https://")]
        .into_iter()
        .flatten()
        .min();

    match start {
        Some(idx) => {
            let rest = &token[idx..];
            let scheme_len = if rest.starts_with("https://") { 8 } else { 7 };
            rest.len() > scheme_len
        }
        None => false,
    }
}
