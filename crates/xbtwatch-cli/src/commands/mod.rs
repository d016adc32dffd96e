mod check;
mod price;
mod rules;

use std::sync::Arc;

use tracing::debug;
use xbtwatch_core::{HttpClient, ReqwestHttpClient};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Report;
use crate::settings;

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let config = settings::resolve(cli)?;
    debug!(
        policy = %config.policy,
        previous_price_path = %config.previous_price_path.display(),
        "resolved configuration"
    );
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    match &cli.command {
        Command::Check(args) => check::run(args, &config, http_client).await,
        Command::Price => price::run(&config, http_client).await,
        Command::Rules => rules::run(&config),
    }
}
