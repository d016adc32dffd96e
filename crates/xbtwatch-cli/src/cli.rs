//! CLI argument definitions for xbtwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `check` | Run one evaluation and notify if the policy fires |
//! | `price` | Fetch and print the current price |
//! | `rules` | Parse and list the rules file |
//!
//! # Configuration precedence
//!
//! flag > `XBTWATCH_*` environment variable > `--config` TOML file > built-in default.
//!
//! # Examples
//!
//! ```bash
//! # Threshold-crossing check, invoked from cron every five minutes
//! XBTWATCH_WEBHOOK_KEY=... xbtwatch check
//!
//! # Legacy one-shot rules
//! xbtwatch check --policy rules --rules-path ./xbt-rules.txt
//!
//! # See what would be sent without touching any state
//! xbtwatch check --dry-run --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Price-move alerts delivered through a webhook trigger.
#[derive(Debug, Parser)]
#[command(
    name = "xbtwatch",
    author,
    version,
    about = "Price-move alerts delivered through a webhook trigger",
    long_about = "xbtwatch fetches the current ask price from a public ticker, compares it \
with the last notified price, and posts a webhook when the move is significant.\n\
\n\
It runs once and exits; schedule it with cron or a systemd timer."
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "XBTWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Short human-readable summary.
    Text,
}

/// Policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicySelector {
    /// Fire on moves larger than the minimum distance, reporting the round threshold crossed.
    Threshold,
    /// Fire the first matching one-shot rule from the rules file.
    Rules,
}

/// Per-field overrides of the configuration file.
#[derive(Debug, Default, Args)]
pub struct ConfigOverrides {
    /// Ticker endpoint URL.
    #[arg(long, global = true, env = "XBTWATCH_TICKER_URL")]
    pub ticker_url: Option<String>,

    /// Pair key inside the ticker `result` object (e.g. XXBTZEUR).
    #[arg(long, global = true, env = "XBTWATCH_PAIR_KEY")]
    pub pair_key: Option<String>,

    /// Webhook base URL.
    #[arg(long, global = true, env = "XBTWATCH_WEBHOOK_BASE_URL")]
    pub webhook_base_url: Option<String>,

    /// Webhook event name.
    #[arg(long, global = true, env = "XBTWATCH_WEBHOOK_EVENT")]
    pub webhook_event: Option<String>,

    /// Webhook secret key.
    #[arg(long, global = true, env = "XBTWATCH_WEBHOOK_KEY", hide_env_values = true)]
    pub webhook_key: Option<String>,

    /// File holding the last notified price.
    #[arg(long, global = true, env = "XBTWATCH_PREVIOUS_PRICE_PATH")]
    pub previous_price_path: Option<PathBuf>,

    /// Rules file used by the `rules` policy.
    #[arg(long, global = true, env = "XBTWATCH_RULES_PATH")]
    pub rules_path: Option<PathBuf>,

    /// Notification policy.
    #[arg(long, global = true, value_enum, env = "XBTWATCH_POLICY")]
    pub policy: Option<PolicySelector>,

    /// Minimum absolute move before anything fires.
    #[arg(long, global = true, env = "XBTWATCH_MIN_DISTANCE")]
    pub min_distance: Option<f64>,

    /// Rounding step for computed thresholds.
    #[arg(long, global = true, env = "XBTWATCH_THRESHOLD_STEP")]
    pub threshold_step: Option<f64>,

    /// Currency symbol used in messages.
    #[arg(long, global = true, env = "XBTWATCH_CURRENCY_SYMBOL")]
    pub currency_symbol: Option<String>,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, env = "XBTWATCH_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one evaluation and notify if the policy fires.
    ///
    /// # Examples
    ///
    ///   xbtwatch check
    ///   xbtwatch check --policy rules
    ///   xbtwatch check --dry-run --price 43500
    Check(CheckArgs),

    /// Fetch and print the current price without evaluating.
    Price,

    /// Parse the rules file and list its rules.
    Rules,
}

/// Arguments for the `check` command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Evaluate without sending, persisting or deleting anything.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Use this price instead of fetching the ticker.
    #[arg(long)]
    pub price: Option<f64>,
}
