//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for evaluation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON, one document per run
    Json,
}

/// CLI arguments for govbot
#[derive(Parser, Debug)]
#[command(name = "govbot")]
#[command(author, version, about = "Governance vote tallying for GitHub issues and pull requests")]
#[command(long_about = r#"
govbot counts the votes of a team on an issue or pull request and keeps the
item's status comment and labels in sync with the result.

An item opts into a vote through its body:

  voting group: @org/council
  <!--vote::marthas approve="+1" ok="eyes" revise="-1" -->

Configuration files are loaded from (in priority order):
1. GOVBOT_* environment variables (GOVBOT_VOTE__THRESHOLD=all)
2. --config <path>     Explicit config file
3. ./govbot.toml       Project-level config
4. ~/.config/govbot/config.toml   Global config

Example:
  govbot vote --repo org/governance --number 42
  govbot scan --repo org/governance --concurrency 8
  govbot result --repo org/governance --number 42 --comment-id 1234567
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Evaluate the vote on one item
    Vote {
        /// Repository (`owner/name`)
        #[arg(long, value_name = "OWNER/NAME")]
        repo: String,
        /// Issue or pull request number
        #[arg(long)]
        number: u64,
    },
    /// Evaluate every open vote in a repository
    Scan {
        /// Repository (`owner/name`)
        #[arg(long, value_name = "OWNER/NAME")]
        repo: String,
        /// Evaluations running at the same time
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Record a manager's result comment and close the vote
    Result {
        /// Repository (`owner/name`)
        #[arg(long, value_name = "OWNER/NAME")]
        repo: String,
        /// Issue or pull request number
        #[arg(long)]
        number: u64,
        /// Id of the comment recording the result
        #[arg(long, value_name = "ID")]
        comment_id: String,
    },
}

impl Command {
    pub fn repository(&self) -> &str {
        match self {
            Command::Vote { repo, .. }
            | Command::Scan { repo, .. }
            | Command::Result { repo, .. } => repo,
        }
    }
}
