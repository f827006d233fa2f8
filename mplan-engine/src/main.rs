//! mplan - meal-plan decoding and preference ranking from the command line
//!
//! Subcommands:
//! - `decode`: replay a meal-plan JSON document in chunks through the stream
//!   decoder and print one JSON event per line
//! - `rank`: rank candidate meals against a weight vector
//! - `aggregate`: turn questionnaire answers into a weight vector
//! - `presets`: list the built-in preference presets

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use mplan_common::config::{ConfigSource, LoggingConfig, TomlConfig};
use mplan_common::{WeightLevel, WeightVector};
use mplan_engine::ranking::{find_preset, presets};
use mplan_engine::{decode_stream, Candidate, DecoderConfig, Questionnaire, RankingEngine};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for mplan
#[derive(Parser, Debug)]
#[command(name = "mplan")]
#[command(about = "Streaming meal-plan decoder and preference ranker")]
#[command(version)]
struct Cli {
    /// Configuration file (overrides MPLAN_CONFIG and the platform default)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a meal-plan document through the stream decoder
    Decode {
        /// Meal-plan JSON document
        file: PathBuf,

        /// Characters per simulated chunk
        #[arg(long, default_value = "64", env = "MPLAN_CHUNK_SIZE")]
        chunk_size: usize,

        /// Number of days in the plan (overrides config)
        #[arg(long)]
        days: Option<u32>,

        /// Meals per day, enables progress reporting (overrides config)
        #[arg(long)]
        meals_per_day: Option<u32>,
    },

    /// Rank candidate meals against a weight vector
    Rank {
        /// JSON array of candidates: [{"id": "...", "scores": {"cost": 0.7, ...}}]
        candidates: PathBuf,

        /// JSON weight vector file
        #[arg(long, conflicts_with = "preset")]
        weights: Option<PathBuf>,

        /// Preset scenario name or slug (e.g. "busy-professional")
        #[arg(long)]
        preset: Option<String>,
    },

    /// Resolve questionnaire answers into a weight vector
    Aggregate {
        /// JSON object of question id → selected option ids
        answers: PathBuf,
    },

    /// List preset scenarios
    Presets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config carries the log level and file; its fallback warning is repeated
    // once tracing is up
    let (config, source) =
        TomlConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!(
        "Starting mplan v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if source == ConfigSource::CompiledDefaults {
        warn!("No config file found, using compiled defaults");
    } else {
        info!("Configuration source: {}", source);
    }

    match cli.command {
        Command::Decode {
            file,
            chunk_size,
            days,
            meals_per_day,
        } => run_decode(&config, &file, chunk_size, days, meals_per_day).await,
        Command::Rank {
            candidates,
            weights,
            preset,
        } => run_rank(&config, &candidates, weights.as_deref(), preset.as_deref()),
        Command::Aggregate { answers } => run_aggregate(&answers),
        Command::Presets => run_presets(),
    }
}

/// RUST_LOG wins over the configured level; a configured log file replaces stderr
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&logging.level)));

    match &logging.file {
        Some(path) => {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

/// Filter used when RUST_LOG is unset: every workspace crate at `level`
fn default_directives(level: &str) -> String {
    ["mplan", "mplan_engine", "mplan_common"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

async fn run_decode(
    config: &TomlConfig,
    file: &Path,
    chunk_size: usize,
    days: Option<u32>,
    meals_per_day: Option<u32>,
) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut settings = config.decoder.clone();
    if let Some(days) = days {
        settings.max_days = days;
    }
    if meals_per_day.is_some() {
        settings.meals_per_day = meals_per_day;
    }
    let decoder_config = DecoderConfig::from_settings(&settings);

    let chunks = split_chunks(&text, chunk_size.max(1));
    info!(
        "Replaying {} ({} bytes) in {} chunks",
        file.display(),
        text.len(),
        chunks.len()
    );

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling decode session");
            ctrl_c_token.cancel();
        }
    });

    let source = stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
    let events = decode_stream(source, decoder_config, cancel);
    futures::pin_mut!(events);

    let mut emitted = 0usize;
    while let Some(item) = events.next().await {
        let event = item.context("Decode session failed")?;
        if event.as_meal().is_some() {
            emitted += 1;
            if let Some(expected) = decoder_config.expected_meals {
                info!("Progress: {}/{} meals", emitted, expected);
            }
        }
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}

/// Split text into chunks of about `size` characters on char boundaries
fn split_chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn run_rank(
    config: &TomlConfig,
    candidates: &Path,
    weights: Option<&Path>,
    preset: Option<&str>,
) -> Result<()> {
    let weights = if let Some(path) = weights {
        read_json::<WeightVector>(path)?
    } else if let Some(name) = preset {
        let preset = find_preset(name)?;
        info!("Using preset '{}'", preset.name);
        preset.weights
    } else if let Some(configured) = config.ranking.weights {
        configured
    } else {
        WeightVector::BALANCED
    };

    let candidates: Vec<Candidate> = read_json(candidates)?;
    info!("Ranking {} candidates", candidates.len());

    let results = RankingEngine::new().rank(&weights, candidates);
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn run_aggregate(answers: &Path) -> Result<()> {
    let answers: BTreeMap<String, Vec<String>> = read_json(answers)?;
    let weights = Questionnaire::standard()
        .aggregate(&answers)
        .context("Invalid questionnaire answers")?;

    let levels: BTreeMap<&str, String> = weights
        .iter()
        .map(|(d, w)| (d.as_str(), WeightLevel::of(w).to_string()))
        .collect();

    let report = serde_json::json!({
        "weights": weights,
        "levels": levels,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_presets() -> Result<()> {
    for preset in presets() {
        println!("{:<20} {}", preset.slug(), preset.description);
        for (dimension, weight) in preset.weights.iter() {
            println!(
                "    {:<9} {:.1}  {}",
                dimension.as_str(),
                weight,
                WeightLevel::of(weight)
            );
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_every_crate() {
        assert_eq!(
            default_directives("debug"),
            "mplan=debug,mplan_engine=debug,mplan_common=debug"
        );
        assert!(EnvFilter::try_new(default_directives("warn")).is_ok());
    }

    #[test]
    fn test_cli_parses_decode_options() {
        let cli = Cli::try_parse_from([
            "mplan", "--config", "plan.toml", "decode", "week.json", "--chunk-size", "8", "--days", "3",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("plan.toml")));
        match cli.command {
            Command::Decode {
                chunk_size, days, ..
            } => {
                assert_eq!(chunk_size, 8);
                assert_eq!(days, Some(3));
            }
            other => panic!("expected decode, got {:?}", other),
        }
    }

    #[test]
    fn test_build_identification_is_embedded() {
        assert!(!env!("GIT_HASH").is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(env!("BUILD_TIMESTAMP")).is_ok());
        assert!(!env!("BUILD_PROFILE").is_empty());
    }

    #[test]
    fn test_split_chunks_keeps_characters_whole() {
        let chunks = split_chunks("aé🍮b", 2);
        assert_eq!(chunks, vec!["aé", "🍮b"]);
    }
}
