use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tweet_score::batch::{campaign_book, parse_submissions, rank, score_batch};
use tweet_score::campaign::CampaignRules;
use tweet_score::classifier::{Classifier, HuggingFaceClassifier};
use tweet_score::config::Config;
use tweet_score::rewards::daily_tallies;
use tweet_score::scoring::{calculate_score, score_with_classifier, SignalOptions};
use tweet_score::{output, ScoreError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single tweet
    Score {
        /// Tweet text; reads stdin when omitted or "-"
        text: Option<String>,

        /// Campaign id from the config file
        #[arg(long)]
        campaign: Option<String>,

        /// Blend in the external classifier signal
        #[arg(long)]
        classify: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a JSON-lines file of submissions and tally daily rewards
    Batch {
        /// File with one submission object per line
        file: PathBuf,

        #[arg(long)]
        classify: bool,

        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Parser, Debug)]
#[command(name = "tweet-score")]
#[command(about = "Score tweet submissions for campaign rewards", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/tweet-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(EXIT_NETWORK);
    }

    let cli = Cli::parse();

    if let Err(e) = tweet_score::telemetry::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let config_path = cli.config.map(PathBuf::from);
    let config = match tweet_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = config.validate() {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    tracing::debug!(campaigns = config.campaigns.len(), "config loaded");

    let code = match cli.command {
        Commands::Score {
            text,
            campaign,
            classify,
            json,
        } => run_score(&config, text, campaign, classify, json).await,
        Commands::Batch {
            file,
            classify,
            json,
        } => run_batch(&config, &file, classify, json).await,
        Commands::Config => run_config(&config),
    };

    std::process::exit(code);
}

/// Build the classifier and its call limits, or exit on failure.
fn build_classifier(config: &Config) -> (HuggingFaceClassifier, SignalOptions) {
    let classifier_config = config.classifier();

    let options = match SignalOptions::from_config(&classifier_config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let classifier = match HuggingFaceClassifier::new(&classifier_config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create classifier client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    if !classifier.has_api_key() {
        tracing::warn!(
            var = classifier_config.api_key_env(),
            "no classifier API key set, requests may be rejected"
        );
    }

    (classifier, options)
}

async fn run_score(
    config: &Config,
    text: Option<String>,
    campaign: Option<String>,
    classify: bool,
    json: bool,
) -> i32 {
    let text = match text.filter(|t| t != "-") {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("Failed to read stdin: {}", e);
                return EXIT_INPUT;
            }
            buf
        }
    };

    let rules = match campaign {
        Some(id) => match config.campaign(&id) {
            Some(rules) => rules.clone(),
            None => {
                eprintln!("Unknown campaign '{}'. Add it under `campaigns:` in the config.", id);
                return EXIT_CONFIG;
            }
        },
        None => CampaignRules::default(),
    };

    let scoring = config.scoring();
    let result = if classify {
        let (classifier, options) = build_classifier(config);
        score_with_classifier(&text, &rules, &scoring, &classifier, &options).await
    } else {
        calculate_score(&text, &rules, &scoring, None)
    };

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize result: {}", e);
                return EXIT_INPUT;
            }
        }
    } else {
        println!("{}", output::format_result(&result, output::should_use_colors()));
    }

    EXIT_SUCCESS
}

async fn run_batch(config: &Config, file: &Path, classify: bool, json: bool) -> i32 {
    let start_time = Instant::now();

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", file.display(), e);
            return EXIT_INPUT;
        }
    };

    let mut submissions = Vec::new();
    let mut parse_errors = Vec::new();
    for parsed in parse_submissions(&content) {
        match parsed {
            Ok(s) => submissions.push(s),
            Err(e) => parse_errors.push(e),
        }
    }

    let book = campaign_book(&config.campaigns);
    let scoring = config.scoring();
    let concurrency = config.batch().concurrency();

    let built = classify.then(|| build_classifier(config));
    let classifier = built.as_ref().map(|(c, _)| c as &dyn Classifier);
    let options = built.as_ref().map(|(_, o)| *o).unwrap_or_default();

    let outcomes = score_batch(submissions, &book, &scoring, classifier, &options, concurrency).await;
    let ranked = rank(&outcomes);
    let tallies = daily_tallies(&outcomes, &book);

    let failures: Vec<(String, &ScoreError)> = parse_errors
        .iter()
        .map(|e| ("input".to_string(), e))
        .chain(
            outcomes
                .iter()
                .filter_map(|o| o.result.as_ref().err().map(|e| (o.submission.id.clone(), e))),
        )
        .collect();

    if json {
        let ranked_json: Vec<_> = ranked
            .iter()
            .map(|(s, r)| {
                serde_json::json!({
                    "id": s.id,
                    "user": s.user,
                    "campaign": s.campaign,
                    "result": r,
                })
            })
            .collect();
        let errors_json: Vec<_> = failures
            .iter()
            .map(|(id, e)| serde_json::json!({ "id": id, "error": e.to_string() }))
            .collect();
        let doc = serde_json::json!({
            "ranked": ranked_json,
            "tallies": tallies,
            "errors": errors_json,
        });
        match serde_json::to_string_pretty(&doc) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Failed to serialize results: {}", e);
                return EXIT_INPUT;
            }
        }
    } else {
        let use_colors = output::should_use_colors();
        println!("{}", output::format_ranked_table(&ranked, use_colors));
        println!();
        println!("{}", output::format_tallies(&tallies, use_colors));
        if !failures.is_empty() {
            eprintln!("{}", output::format_failures(&failures, use_colors));
        }
    }

    tracing::debug!(
        scored = ranked.len(),
        failed = failures.len(),
        elapsed = ?start_time.elapsed(),
        "batch complete"
    );

    EXIT_SUCCESS
}

fn run_config(config: &Config) -> i32 {
    let effective = Config {
        scoring: Some(config.scoring()),
        classifier: Some(config.classifier()),
        batch: Some(config.batch()),
        campaigns: config.campaigns.clone(),
    };

    match serde_saphyr::to_string(&effective) {
        Ok(yaml) => {
            print!("{}", yaml);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
            EXIT_CONFIG
        }
    }
}
