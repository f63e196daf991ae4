//! Command line and environment configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use directories::BaseDirs;

use crate::models::{Collection, UserId};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".hymnal-bot";
/// SQLite file holding the audit trail.
const AUDIT_DB_NAME: &str = "audit.sqlite";
/// Folder for log files, relative to the data directory.
const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_NAME: &str = "errors.log";

#[derive(Debug, Parser)]
#[command(name = "hymnal-bot", version, about = "Look up hymns by number or title")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

impl Cli {
    /// `serve` is the default when no subcommand is given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bot on the terminal console together with the healthcheck.
    Serve(ServeArgs),
    /// Turn OCR'd index text into catalog rows.
    ExtractTitles(ExtractArgs),
    /// Print the most recent hymn deliveries from the audit trail.
    Usage(UsageArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Catalog file (`collection;number;title`).
    #[arg(long, env = "HYMNAL_CATALOG", default_value = "songs.csv")]
    pub catalog: PathBuf,

    /// Folder containing one sub-folder of page images per collection.
    #[arg(long, env = "HYMNAL_ASSETS", default_value = ".")]
    pub assets: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Port for the HTTP healthcheck.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// User id the console conversation is recorded under.
    #[arg(long, env = "HYMNAL_USER_ID", default_value_t = 1)]
    pub user_id: UserId,
}

#[derive(Debug, Clone, Args)]
pub struct DataArgs {
    /// Where the audit trail and logs are kept. Defaults to ~/.hymnal-bot.
    #[arg(long, env = "HYMNAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl DataArgs {
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn audit_db_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(AUDIT_DB_NAME))
    }

    pub fn log_file_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(LOG_DIR_NAME).join(LOG_FILE_NAME))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExtractArgs {
    /// Collection id written into every row.
    #[arg(long, value_parser = parse_collection)]
    pub collection: Collection,

    /// Plain text extracted from the hymnal's index.
    #[arg(long)]
    pub input: PathBuf,

    /// Destination file; rows go to stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct UsageArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// How many deliveries to show.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

fn parse_collection(value: &str) -> Result<Collection, String> {
    value.parse().map_err(|err: crate::error::UnknownCollection| err.to_string())
}

/// Resolve `~/.hymnal-bot`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
