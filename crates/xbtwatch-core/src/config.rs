//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config. The
//! CLI layers flags and `XBTWATCH_*` environment variables on top of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::validate_positive;
use crate::policy::{PolicyKind, DEFAULT_MIN_DISTANCE, DEFAULT_THRESHOLD_STEP};
use crate::ValidationError;

pub const DEFAULT_TICKER_URL: &str = "https://api.kraken.com/0/public/Ticker?pair=XBTEUR";
pub const DEFAULT_PAIR_KEY: &str = "XXBTZEUR";
pub const DEFAULT_WEBHOOK_BASE_URL: &str = "https://maker.ifttt.com";
pub const DEFAULT_WEBHOOK_EVENT: &str = "xbt_price_alert";
pub const DEFAULT_PREVIOUS_PRICE_PATH: &str = "xbt-previous-price.txt";
pub const DEFAULT_RULES_PATH: &str = "xbt-rules.txt";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("webhook key is not set (use --webhook-key or XBTWATCH_WEBHOOK_KEY)")]
    MissingWebhookKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ticker_url: String,
    pub pair_key: String,
    pub webhook_base_url: String,
    pub webhook_event: String,
    #[serde(skip_serializing)]
    pub webhook_key: Option<String>,
    pub previous_price_path: PathBuf,
    pub rules_path: PathBuf,
    pub policy: PolicyKind,
    pub min_distance: f64,
    pub threshold_step: f64,
    pub currency_symbol: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ticker_url: String::from(DEFAULT_TICKER_URL),
            pair_key: String::from(DEFAULT_PAIR_KEY),
            webhook_base_url: String::from(DEFAULT_WEBHOOK_BASE_URL),
            webhook_event: String::from(DEFAULT_WEBHOOK_EVENT),
            webhook_key: None,
            previous_price_path: PathBuf::from(DEFAULT_PREVIOUS_PRICE_PATH),
            rules_path: PathBuf::from(DEFAULT_RULES_PATH),
            policy: PolicyKind::default(),
            min_distance: DEFAULT_MIN_DISTANCE,
            threshold_step: DEFAULT_THRESHOLD_STEP,
            currency_symbol: String::from(DEFAULT_CURRENCY_SYMBOL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating, for callers that layer
    /// overrides on top and validate the merged result.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("ticker_url", &self.ticker_url)?;
        require_non_empty("pair_key", &self.pair_key)?;
        require_non_empty("webhook_base_url", &self.webhook_base_url)?;
        require_non_empty("webhook_event", &self.webhook_event)?;
        validate_positive("min_distance", self.min_distance)?;
        validate_positive("threshold_step", self.threshold_step)?;
        if self.timeout_ms == 0 {
            return Err(ValidationError::NonPositiveValue { field: "timeout_ms" });
        }
        Ok(())
    }

    /// The webhook key, required whenever a notification may be sent.
    pub fn require_webhook_key(&self) -> Result<&str, ConfigError> {
        self.webhook_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingWebhookKey)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyConfigField { field });
    }
    Ok(())
}
