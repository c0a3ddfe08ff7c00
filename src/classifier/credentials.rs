/// Read an API token from the named environment variable.
/// Returns Some(token) if the variable is set and non-empty, None otherwise.
pub fn get_api_key_from_env(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variable() {
        assert!(get_api_key_from_env("TWEET_SCORE_TEST_UNSET_TOKEN_VAR").is_none());
    }
}
