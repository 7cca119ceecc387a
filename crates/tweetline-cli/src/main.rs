//! tweetline - tweet extraction pipeline CLI
//!
//! Extracts user timelines, replies, searches and hashtags from the
//! Twitter API and persists each result table as Parquet.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod input;

use cmd::ModeArgs;
use config::Config;
use tweetline_twitter::Orchestration;

#[derive(Parser)]
#[command(name = "tweetline")]
#[command(about = "Extract tweets into fixed-schema Parquet tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./tweetline.toml or ~/.config/tweetline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the listed users' timelines
    Timelines(ModeArgs),
    /// Extract replies to the listed users
    Replies(ModeArgs),
    /// Search for the listed usernames
    SearchUsers(ModeArgs),
    /// Search for the listed query strings
    SearchQueries(ModeArgs),
    /// Extract the listed hashtags
    Hashtags(ModeArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect); bars double as the activity
    // indicator, so log routing goes through them on a TTY
    let progress = tweetline_core::ProgressContext::new();
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    tweetline_core::init_logging(cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Timelines(args) => cmd::run(Orchestration::Timelines, args, &config, &progress),
        Command::Replies(args) => cmd::run(Orchestration::Replies, args, &config, &progress),
        Command::SearchUsers(args) => cmd::run(Orchestration::SearchUsers, args, &config, &progress),
        Command::SearchQueries(args) => {
            cmd::run(Orchestration::SearchQueries, args, &config, &progress)
        }
        Command::Hashtags(args) => cmd::run(Orchestration::Hashtags, args, &config, &progress),
        Command::Config => {
            cmd::show_config(&config);
            Ok(())
        }
    }
}
