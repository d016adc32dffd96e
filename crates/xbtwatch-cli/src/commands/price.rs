use std::sync::Arc;

use serde_json::json;
use xbtwatch_core::{Config, HttpClient, KrakenTicker, PriceSource};

use crate::error::CliError;
use crate::output::Report;

pub async fn run(config: &Config, http_client: Arc<dyn HttpClient>) -> Result<Report, CliError> {
    let ticker = KrakenTicker::new(http_client, &config.ticker_url, &config.pair_key)
        .with_timeout_ms(config.timeout_ms);
    let price = ticker.fetch_price().await?;
    let formatted = price.format_with(&config.currency_symbol);

    Ok(Report::new(
        "price",
        json!({
            "pair": ticker.pair_key(),
            "price": price,
            "formatted": formatted,
        }),
    )
    .with_line(format!("{} ask {formatted}", ticker.pair_key())))
}
