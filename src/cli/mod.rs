pub mod init;
pub mod migrate;
pub mod serve;
pub mod token;
pub mod user;

use crate::{Config, Database};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(version)]
#[command(about = "Recipe postings with reusable tags and steps", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "pantry.toml", env = "PANTRY_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config and data directories
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Apply migrations and start the HTTP API
    Serve {
        /// Overrides server.host
        #[arg(short = 'H', long)]
        host: Option<String>,
        /// Overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending migrations
    Migrate {
        /// Only report which migrations are applied
        #[arg(long)]
        status: bool,
    },
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: Option<String>,
    },
    List,
    Remove {
        email: String,
    },
    Passwd {
        email: String,
    },
}

#[derive(Subcommand)]
pub enum TokenCommand {
    /// Issue a token after checking the user's password; the raw value is
    /// printed once
    Create {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "cli")]
        name: String,
        /// Overrides auth.token_lifetime_days
        #[arg(long)]
        expires_days: Option<u32>,
    },
    List {
        #[arg(long)]
        email: Option<String>,
    },
    Revoke {
        id: i64,
    },
}

/// Loads the config and opens its database with the configured pool size.
pub(crate) fn open(config_path: &Path) -> anyhow::Result<(Config, Database)> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    Ok((config, db))
}
