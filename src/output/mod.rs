pub mod formatter;

pub use formatter::{
    format_failures, format_ranked_table, format_result, format_score, format_tallies,
    should_use_colors,
};
