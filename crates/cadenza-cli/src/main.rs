use anyhow::Result;
use cadenza_etl::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod tui;

#[derive(Debug, Parser)]
#[command(name = "cadenza", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding trained artifacts (default: ~/.local/share/cadenza/models)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Train the similarity model from a track dataset
    ///
    /// Runs three stages in order, each writing one artifact into the
    /// artifact directory:
    ///
    /// - ingest: reads the CSV, drops duplicate track ids and incomplete rows,
    ///   and stores the catalog (catalog.db)
    /// - featurize: standardizes audio features, scales popularity, one-hot
    ///   encodes genres and applies the configured weights (pipeline.json)
    /// - index: builds the cosine similarity index over every track
    ///   (index.json.gz, manifest.json)
    ///
    /// Retraining replaces the previous artifacts.
    Train {
        /// Path to the dataset CSV (default: data_path from config)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Recommend songs similar to a title
    Recommend {
        /// Song title (exact match preferred, substring match as fallback)
        title: String,

        /// Maximum number of recommendations
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Prompt for titles until 'exit'
    Interactive,
    /// Browse recommendations in a terminal UI
    Browse {
        /// Song title to start from
        title: String,
    },
    /// Show what the artifact directory contains
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole config file
    Get {
        /// Key such as data_path or weights.loudness
        key: Option<String>,
    },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.artifacts {
        Some(dir) => Config::load_with_artifact_dir(dir)?,
        None => Config::load()?,
    };

    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e:?}"))?;

    match cli.command {
        Commands::Train { data } => {
            let data_path = data.unwrap_or_else(|| config.data_path.clone());
            commands::run_train(data_path, &config).await?;
        }
        Commands::Recommend { title, limit } => {
            commands::run_recommend(&config, &title, limit)?;
        }
        Commands::Interactive => {
            commands::run_interactive(&config)?;
        }
        Commands::Browse { title } => {
            commands::run_browse(&config, &title)?;
        }
        Commands::Status => {
            commands::show_status(&config)?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::config::show_config()?,
            ConfigCommand::Get { key } => commands::config::get_config(key)?,
            ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value)?,
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Example => commands::config::show_example(),
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
