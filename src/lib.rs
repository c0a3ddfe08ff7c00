pub mod batch;
pub mod campaign;
pub mod classifier;
pub mod config;
pub mod error;
pub mod output;
pub mod rewards;
pub mod scoring;
pub mod submission;
pub mod telemetry;

pub use error::ScoreError;
