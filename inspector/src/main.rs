use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use inspector::config::{AppConfig, Command};
use inspector::services::{query, watch};
use shared::client::build_client;
use shared::crawler::crawl;
use shared::error::{AsConfigError, AsRpcError, MainError};

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = AppConfig::parse();

    config.log.init();

    let client = build_client(&config.tendermint_url, &config.client_options())
        .into_config_error()?;

    tracing::debug!(
        url = %client.url(),
        compat_mode = %config.compat_mode,
        "Built CometBFT RPC client"
    );

    match config.command {
        Command::Watch {
            from_height,
            interval_ms,
        } => {
            let first_height = match from_height {
                Some(height) => height,
                None => client.latest_height().await.into_rpc_error()?,
            };
            let client = Arc::new(client);

            tracing::info!(first_height, "Watching commits");

            crawl(
                move |height| {
                    let client = client.clone();
                    async move {
                        watch::crawling_fn(height, client).await.map(|_| ())
                    }
                },
                first_height,
                Some(Duration::from_millis(interval_ms)),
            )
            .await
        }
        command => query::run(&client, command).await,
    }
}
