//! Resolves the effective [`Config`] from file, environment and flags.
//!
//! clap already folds `XBTWATCH_*` variables into [`ConfigOverrides`], so
//! this layer only has to apply overrides on top of the file.

use xbtwatch_core::{Config, PolicyKind};

use crate::cli::{Cli, ConfigOverrides, PolicySelector};
use crate::error::CliError;

pub fn resolve(cli: &Cli) -> Result<Config, CliError> {
    let base = match &cli.config {
        Some(path) => Config::read_file(path)?,
        None => Config::default(),
    };
    let config = apply_overrides(base, &cli.overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(mut config: Config, overrides: &ConfigOverrides) -> Config {
    if let Some(url) = &overrides.ticker_url {
        config.ticker_url = url.clone();
    }
    if let Some(pair_key) = &overrides.pair_key {
        config.pair_key = pair_key.clone();
    }
    if let Some(base_url) = &overrides.webhook_base_url {
        config.webhook_base_url = base_url.clone();
    }
    if let Some(event) = &overrides.webhook_event {
        config.webhook_event = event.clone();
    }
    if let Some(key) = &overrides.webhook_key {
        config.webhook_key = Some(key.clone());
    }
    if let Some(path) = &overrides.previous_price_path {
        config.previous_price_path = path.clone();
    }
    if let Some(path) = &overrides.rules_path {
        config.rules_path = path.clone();
    }
    if let Some(policy) = overrides.policy {
        config.policy = to_policy_kind(policy);
    }
    if let Some(min_distance) = overrides.min_distance {
        config.min_distance = min_distance;
    }
    if let Some(step) = overrides.threshold_step {
        config.threshold_step = step;
    }
    if let Some(symbol) = &overrides.currency_symbol {
        config.currency_symbol = symbol.clone();
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config
}

const fn to_policy_kind(selector: PolicySelector) -> PolicyKind {
    match selector {
        PolicySelector::Threshold => PolicyKind::Threshold,
        PolicySelector::Rules => PolicyKind::Rules,
    }
}
