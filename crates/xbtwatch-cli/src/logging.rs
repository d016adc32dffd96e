//! Diagnostic logging on stderr.
//!
//! Stdout carries command results only, so every log line goes to stderr.
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CliError;

pub const DEFAULT_FILTER: &str = "warn,xbtwatch=info";

pub fn init_logging(json: bool) -> Result<(), CliError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let initialized = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    initialized.map_err(|error| CliError::Logging(error.to_string()))
}
