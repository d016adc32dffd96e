use std::sync::Arc;

use serde_json::json;
use xbtwatch_core::{
    Config, EvaluatorBuilder, HttpClient, Price, RunOutcome, StaticPrice,
};

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::output::Report;

pub async fn run(
    args: &CheckArgs,
    config: &Config,
    http_client: Arc<dyn HttpClient>,
) -> Result<Report, CliError> {
    let mut builder = EvaluatorBuilder::from_config(config, http_client, args.dry_run)?;
    if let Some(value) = args.price {
        builder = builder.source(Arc::new(StaticPrice(Price::new(value)?)));
    }
    let evaluator = builder.build()?;

    let outcome = evaluator.run().await?;
    let summary = summarize(&outcome, &config.currency_symbol);

    Ok(Report::new(
        "check",
        json!({
            "policy": evaluator.policy_kind(),
            "dry_run": args.dry_run,
            "result": outcome,
        }),
    )
    .with_line(summary))
}

fn summarize(outcome: &RunOutcome, symbol: &str) -> String {
    match outcome {
        RunOutcome::Seeded { price } => {
            format!("seeded baseline at {}", price.format_with(symbol))
        }
        RunOutcome::NoBaseline { price } => format!(
            "dry run: no previous price recorded, would seed baseline at {}",
            price.format_with(symbol)
        ),
        RunOutcome::Quiet { price, previous } => format!(
            "quiet: {} vs last notified {}",
            price.format_with(symbol),
            previous.format_with(symbol)
        ),
        RunOutcome::Notified { payload, .. } => {
            format!("notified: {} ({})", payload.value1, payload.value2)
        }
        RunOutcome::DryRun { payload, .. } => {
            format!("dry run, would notify: {} ({})", payload.value1, payload.value2)
        }
    }
}
