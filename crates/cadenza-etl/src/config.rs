use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use cadenza_core::FeatureWeights;

/// Configuration for cadenza.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CADENZA_* prefix)
/// 3. Config file (~/.config/cadenza/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the track dataset CSV used for training.
    ///
    /// Can be set via:
    /// - CLI: cadenza train --data /path/to/dataset.csv
    /// - ENV: CADENZA_DATA_PATH
    /// - Config: data_path = "/path/to/dataset.csv"
    /// - Default: ~/.local/share/cadenza/dataset.csv
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Directory holding the trained artifacts.
    ///
    /// Can be set via:
    /// - CLI: --artifacts /path/to/models
    /// - ENV: CADENZA_ARTIFACT_DIR
    /// - Config: artifact_dir = "/path/to/models"
    /// - Default: ~/.local/share/cadenza/models
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Feature weights used at training time.
    #[serde(default)]
    pub weights: FeatureWeights,

    /// Logger settings.
    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            artifact_dir: default_artifact_dir(),
            weights: FeatureWeights::default(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/cadenza/config.toml
    /// Reads environment variables with CADENZA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("cadenza");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        config
            .weights
            .validate()
            .context("Invalid feature weights in configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom artifact directory.
    ///
    /// This is used when the --artifacts CLI flag is provided.
    pub fn load_with_artifact_dir(artifact_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.artifact_dir = artifact_dir;
        Ok(config)
    }
}

fn data_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
}

/// Returns: ~/.local/share/cadenza/dataset.csv (or platform equivalent)
fn default_data_path() -> PathBuf {
    data_root().join("dataset.csv")
}

/// Returns: ~/.local/share/cadenza/models (or platform equivalent)
fn default_artifact_dir() -> PathBuf {
    data_root().join("models")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cadenza/config.toml
/// - macOS: ~/Library/Application Support/cadenza/config.toml
/// - Windows: %APPDATA%\cadenza\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cadenza Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CADENZA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Track dataset used by `cadenza train`
#
# Can also be set via:
# - CLI: cadenza train --data /path/to/dataset.csv
# - Environment: CADENZA_DATA_PATH=/path/to/dataset.csv
#
# Default: Platform-specific data directory
#data_path = "/path/to/dataset.csv"

# Directory where trained artifacts are written and read
#
# Can also be set via:
# - CLI: cadenza --artifacts /path/to/models recommend "..."
# - Environment: CADENZA_ARTIFACT_DIR=/path/to/models
#
# Default: Platform-specific data directory
#artifact_dir = "/path/to/models"

# Feature weights applied at training time. Every weight must be positive.
# Changing them requires retraining.
[weights]
track_genre = 2.2
loudness = 2.5
acousticness = 2.0
valence = 1.8
energy = 1.5
tempo = 1.5
instrumentalness = 1.2
danceability = 1.0
liveness = 0.8
explicit = 3.0
popularity = 0.1
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.data_path.as_os_str().is_empty());
        assert!(config.artifact_dir.ends_with("models"));
        assert_eq!(config.weights, FeatureWeights::default());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_artifact_dir() {
        let custom_path = PathBuf::from("/tmp/cadenza-models");
        let config = Config::load_with_artifact_dir(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().artifact_dir, custom_path);
    }

    #[test]
    fn test_example_config_weights_match_defaults() {
        #[derive(Deserialize)]
        struct Example {
            weights: FeatureWeights,
        }

        let example: Example = toml::from_str(example_config()).unwrap();
        assert_eq!(example.weights, FeatureWeights::default());
    }
}
