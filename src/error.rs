use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// The submission has no usable text or names an unknown campaign.
    /// No scoring was performed.
    InvalidInput(String),
    /// The external classifier failed or timed out. Callers recover by
    /// falling back to the heuristic score.
    ExternalSignalUnavailable(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ScoreError::ExternalSignalUnavailable(msg) => {
                write!(f, "External signal unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScoreError {}
