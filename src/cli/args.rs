//! Command line argument parsing for the chatscore CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// chatscore - heuristic scoring for chatbot conversations
#[derive(Parser, Debug, Clone)]
#[command(name = "chatscore")]
#[command(about = "Score chat messages, predict churn, recommend products and draft FAQs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ChatscoreArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "CHATSCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ChatscoreArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score one message (sentiment, intent, anomaly)
    Analyze(AnalyzeArgs),

    /// Score every message of a JSON file
    Batch(BatchArgs),

    /// Predict churn risk from a user's activity
    Churn(ChurnArgs),

    /// Recommend products for a user
    Recommend(RecommendArgs),

    /// Cluster conversations and draft FAQ entries
    Faq(FaqArgs),

    /// Print the effective configuration
    Config,
}

/// Arguments for scoring a message
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Message text
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Message context as JSON (e.g. '{"userId": "u1", "ipMismatch": true}')
    #[arg(long, value_name = "JSON")]
    pub context: Option<String>,

    /// Sender id; overrides the id in --context
    #[arg(short, long)]
    pub user: Option<String>,
}

/// Arguments for scoring a batch of messages
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// JSON array of {"message", "context"} objects
    #[arg(value_name = "MESSAGES_FILE")]
    pub messages_file: PathBuf,
}

/// Arguments for churn prediction
#[derive(Parser, Debug, Clone)]
pub struct ChurnArgs {
    /// User id reported in the result
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Activity JSON file (camelCase fields, all optional)
    #[arg(value_name = "ACTIVITY_FILE")]
    pub activity_file: PathBuf,
}

/// Arguments for product recommendations
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// User id
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Request context as JSON (e.g. '{"category": "electronics"}')
    #[arg(long, value_name = "JSON")]
    pub context: Option<String>,
}

/// Arguments for FAQ generation
#[derive(Parser, Debug, Clone)]
pub struct FaqArgs {
    /// JSON array of {"question", "answer"} objects
    #[arg(value_name = "CONVERSATIONS_FILE")]
    pub conversations_file: PathBuf,

    /// Print clusters along with FAQs and suggestions
    #[arg(long)]
    pub clusters: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
