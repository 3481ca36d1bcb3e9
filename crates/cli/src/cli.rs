//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mailrelay - resilient email dispatch across interchangeable providers
#[derive(Parser, Debug)]
#[command(
    name = "mailrelay",
    author,
    version,
    about = "Resilient email dispatch with provider failover",
    long_about = "Dispatches email through an ordered set of providers.\n\n\
                  Duplicate message ids are skipped, a global fixed-window rate \n\
                  limit is enforced, and failed attempts rotate to the next \n\
                  provider until the retry budget is used up."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MAILRELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MAILRELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single message
    Send(SendArgs),

    /// Push a batch of synthetic messages through the dispatcher
    Simulate(SimulateArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults if omitted
    #[arg(short, long, env = "MAILRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the message from a JSON file instead of flags
    #[arg(long, conflicts_with_all = ["id", "to", "subject", "body"])]
    pub message: Option<PathBuf>,

    /// Message id (dedup key)
    #[arg(long, required_unless_present = "message")]
    pub id: Option<String>,

    /// Recipient address
    #[arg(long, required_unless_present = "message")]
    pub to: Option<String>,

    #[arg(long, default_value = "")]
    pub subject: String,

    #[arg(long, default_value = "")]
    pub body: String,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `simulate` command
#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults if omitted
    #[arg(short, long, env = "MAILRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of messages to dispatch
    #[arg(short = 'n', long, default_value = "20", env = "MAILRELAY_COUNT")]
    pub count: u64,

    /// Re-send the previous message id every K messages (0 = never)
    #[arg(long, default_value = "0")]
    pub duplicate_every: u64,

    /// Delay between messages in milliseconds
    #[arg(long, default_value = "0")]
    pub interval_ms: u64,

    /// Seed simulated providers for a reproducible run
    #[arg(long, env = "MAILRELAY_SEED")]
    pub seed: Option<u64>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "MAILRELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "mailrelay.toml", env = "MAILRELAY_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in defaults if omitted
    #[arg(short, long, env = "MAILRELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
