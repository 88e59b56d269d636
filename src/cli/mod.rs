//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// OAuth2 social-login endpoint test harness
#[derive(Parser, Debug)]
#[command(name = "oauth-harness")]
#[command(version)]
#[command(about = "Exercise an OAuth2 social-login backend endpoint")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the whole test case catalog
    Run(RunArgs),

    /// Send a single token or catalog case
    Single(SingleArgs),

    /// Exchange an identity-provider credential for session tokens
    Exchange(ExchangeArgs),

    /// List test cases and providers
    List(ListArgs),

    /// Inspect or create configuration
    Config(ConfigArgs),
}

/// Backend and output options shared by the request commands
#[derive(ClapArgs, Debug, Default)]
pub struct TargetArgs {
    /// Backend base URL
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Provider (google-oauth2, facebook, twitter, github)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save output to file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Delay between requests in milliseconds
    #[arg(long)]
    pub pacing_ms: Option<u64>,
}

/// Arguments for single command
#[derive(Parser, Debug)]
pub struct SingleArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Token to send (may be empty)
    #[arg(short, long, conflicts_with = "case", required_unless_present = "case")]
    pub token: Option<String>,

    /// Name of a catalog case to run instead
    #[arg(long)]
    pub case: Option<String>,
}

/// Arguments for exchange command
#[derive(Parser, Debug)]
pub struct ExchangeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Credential produced by the identity provider
    #[arg(long)]
    pub credential: Option<String>,

    /// Body field carrying the credential
    #[arg(long)]
    pub credential_field: Option<String>,

    /// Report a failed identity-provider login instead
    #[arg(long, conflicts_with = "credential")]
    pub widget_error: Option<String>,

    /// Log out after the exchange
    #[arg(long)]
    pub logout: bool,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show test case tokens and descriptions
    #[arg(short, long)]
    pub detailed: bool,

    /// Show supported providers
    #[arg(short, long)]
    pub providers: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (.yaml, .yml or .json)
        #[arg(default_value = "oauth-harness.yaml")]
        path: PathBuf,
    },

    /// Describe environment variables
    Env,
}
