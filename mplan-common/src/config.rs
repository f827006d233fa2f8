//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a small TOML file. It is located by priority:
//! 1. Command-line argument (highest priority)
//! 2. `MPLAN_CONFIG` environment variable
//! 3. Platform config file (`<config_dir>/mplan/config.toml`, then
//!    `/etc/mplan/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must exist. A missing platform file is not
//! an error: a warning is logged and compiled defaults are used.

use crate::weights::WeightVector;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "MPLAN_CONFIG";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stream decoder limits (optional)
    #[serde(default)]
    pub decoder: DecoderSettings,

    /// Ranking defaults (optional)
    #[serde(default)]
    pub ranking: RankingSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Stream decoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderSettings {
    /// Highest `day_<n>` section the decoder will look at
    #[serde(default = "default_max_days")]
    pub max_days: u32,

    /// Meals expected per day, used for progress reporting
    #[serde(default)]
    pub meals_per_day: Option<u32>,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            max_days: default_max_days(),
            meals_per_day: None,
        }
    }
}

/// Ranking settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Weights used when a ranking request supplies none
    #[serde(default)]
    pub weights: Option<WeightVector>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_days() -> u32 {
    7
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformFile(PathBuf),
    CompiledDefaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandLine(p) => write!(f, "command line ({})", p.display()),
            Self::Environment(p) => write!(f, "{} ({})", CONFIG_ENV_VAR, p.display()),
            Self::PlatformFile(p) => write!(f, "platform config ({})", p.display()),
            Self::CompiledDefaults => f.write_str("compiled defaults"),
        }
    }
}

impl TomlConfig {
    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load configuration following the priority order
    pub fn resolve(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::CommandLine(path.to_path_buf())));
        }

        // Priority 2: Environment variable
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(path);
            let config = Self::load(&path)?;
            return Ok((config, ConfigSource::Environment(path)));
        }

        // Priority 3: Platform config file
        if let Some(path) = platform_config_file() {
            info!("Loading configuration from {}", path.display());
            let config = Self::load(&path)?;
            return Ok((config, ConfigSource::PlatformFile(path)));
        }

        // Priority 4: Compiled defaults
        warn!("No config file found, using compiled defaults");
        Ok((Self::default(), ConfigSource::CompiledDefaults))
    }

    fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}' (expected one of {})",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }
        if self.decoder.max_days == 0 {
            return Err(Error::Config("decoder.max_days must be at least 1".to_string()));
        }
        if self.decoder.meals_per_day == Some(0) {
            return Err(Error::Config(
                "decoder.meals_per_day must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// First existing platform config file, if any
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mplan").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mplan/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::Dimension;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TomlConfig::parse("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.decoder.max_days, 7);
        assert!(config.ranking.weights.is_none());
    }

    #[test]
    fn test_ranking_weights_section() {
        let config = TomlConfig::parse(
            r#"
            [ranking.weights]
            cost = 0.9
            health = 1.4
            "#,
        )
        .unwrap();
        let weights = config.ranking.weights.unwrap();
        assert_eq!(weights.get(Dimension::Cost), 0.9);
        assert_eq!(weights.get(Dimension::Health), 1.0);
        assert_eq!(weights.get(Dimension::Time), 0.0);
    }

    #[test]
    fn test_rejects_zero_max_days() {
        let err = TomlConfig::parse("[decoder]\nmax_days = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let err = TomlConfig::parse("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }
}
