//! Integration tests for configuration resolution
//!
//! Tests that manipulate MPLAN_CONFIG are marked with #[serial] so they run
//! sequentially, not in parallel.

use mplan_common::config::{ConfigSource, TomlConfig, CONFIG_ENV_VAR};
use mplan_common::{Dimension, Error};
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn test_command_line_beats_environment() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[decoder]\nmax_days = 3\n");
    let from_env = write_config(&dir, "env.toml", "[decoder]\nmax_days = 5\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let (config, source) = TomlConfig::resolve(Some(&cli)).unwrap();

    assert_eq!(config.decoder.max_days, 3);
    assert_eq!(source, ConfigSource::CommandLine(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_variable_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "env.toml",
        "[logging]\nlevel = \"debug\"\n\n[ranking.weights]\ncultural = 0.8\n",
    );
    env::set_var(CONFIG_ENV_VAR, &path);

    let (config, source) = TomlConfig::resolve(None).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.ranking.weights.unwrap().get(Dimension::Cultural),
        0.8
    );
    assert_eq!(source, ConfigSource::Environment(path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = TomlConfig::resolve(Some(&missing)).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[decoder\nmax_days = ");

    let err = TomlConfig::load(&path).unwrap_err();

    assert!(err.to_string().contains("Invalid config TOML"));
}

#[test]
fn test_meals_per_day_round_trips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "plan.toml", "[decoder]\nmeals_per_day = 3\n");

    let config = TomlConfig::load(&path).unwrap();

    assert_eq!(config.decoder.meals_per_day, Some(3));
    assert_eq!(config.decoder.max_days, 7);
}

#[test]
fn test_errors_name_the_offending_input() {
    let err = "umami".parse::<Dimension>().unwrap_err();
    assert!(matches!(&err, Error::InvalidInput(message) if message.contains("umami")));

    let missing = std::path::Path::new("/nonexistent/mplan/config.toml");
    let err = TomlConfig::load(missing).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("/nonexistent/mplan/config.toml"));
}
