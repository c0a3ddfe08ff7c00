use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset
pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Pick the log filter: an explicit directive string wins over `verbose`.
fn build_filter(directives: Option<&str>, verbose: bool) -> Result<EnvFilter> {
    let directives = directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| default_level(verbose));

    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter '{}' in RUST_LOG", directives))
}

/// Install the stderr log subscriber. RUST_LOG wins over `verbose`.
pub fn init(verbose: bool) -> Result<()> {
    let from_env = std::env::var("RUST_LOG").ok();
    let filter = build_filter(from_env.as_deref(), verbose)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to set up logging: {}", e))
}
