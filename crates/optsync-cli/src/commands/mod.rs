//! CLI command definitions and handlers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use optsync_api::{AdminApi, ApiConfig, AuthenticatedTransport, HttpConnection};
use optsync_core::term::DEFAULT_MAPPING_PATH;

pub mod adopt;
pub mod query;
pub mod terms_map;
pub mod upload;

/// OptSync - sync textbook opt-outs and adoptions to the admin API
#[derive(Parser)]
#[command(name = "optsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Term name to term code mapping file
    #[arg(long, global = true, env = "OPTSYNC_TERM_MAPPING", default_value = DEFAULT_MAPPING_PATH)]
    pub mapping: PathBuf,

    /// Directory for run logs
    #[arg(long, global = true, env = "OPTSYNC_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload opt-out decisions from an export CSV
    Upload(upload::UploadArgs),

    /// Bulk-create adoptions for a term from a booklist CSV
    Adopt(adopt::AdoptArgs),

    /// Check API health
    Status,

    /// List terms known to the API
    Terms,

    /// List adoptions for a term
    Adoptions {
        /// Term code, e.g. 2026SP
        term: String,
    },

    /// Regenerate the term mapping file from the API's term list
    TermsMap,
}

impl Commands {
    /// Prefix of the log file for this command.
    pub fn log_name(&self) -> &'static str {
        match self {
            Commands::Upload(_) => "opt-out",
            Commands::Adopt(_) => "bulk-adoption",
            Commands::Status => "status",
            Commands::Terms => "terms",
            Commands::Adoptions { .. } => "adoptions",
            Commands::TermsMap => "terms-map",
        }
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Upload(args) => upload::execute(args, &self.mapping).await,
            Commands::Adopt(args) => adopt::execute(args).await,
            Commands::Status => query::status().await,
            Commands::Terms => query::terms().await,
            Commands::Adoptions { term } => query::adoptions(&term).await,
            Commands::TermsMap => terms_map::execute(&self.mapping).await,
        }
    }
}

pub type Api = AdminApi<AuthenticatedTransport<HttpConnection>>;

/// Build the API client from the environment and obtain the first token.
pub async fn connect() -> Result<Api> {
    let config = ApiConfig::from_env().context("Invalid API configuration")?;
    let connection = HttpConnection::new(config).context("Failed to build HTTP client")?;
    let api = AdminApi::new(AuthenticatedTransport::new(connection));

    api.transport()
        .authenticate()
        .await
        .context("Failed to obtain auth token")?;

    Ok(api)
}
