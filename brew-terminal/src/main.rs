//! Brew terminal - operator register for the café counter

mod command;
mod terminal;

use std::sync::Arc;

use anyhow::Context;
use brew_checkout::{CheckoutConfig, LocalStore, logger};
use brew_client::{BrewApi, ClientConfig};

use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = CheckoutConfig::from_env();
    logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(
        api_url = %config.api_url,
        tax_percent = config.tax_percent,
        poll_ms = config.gcash.poll_interval.as_millis() as u64,
        "Brew terminal starting"
    );

    let store = match config.database_path() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating data dir {}", dir.display()))?;
            }
            LocalStore::open(&path).with_context(|| format!("opening {}", path.display()))?
        }
        None => {
            tracing::warn!("BREW_DATA_DIR not set, open GCash payments will not survive a restart");
            LocalStore::open_in_memory()?
        }
    };

    let mut client_config = ClientConfig::new(&config.api_url).with_timeout(config.request_timeout);
    if !config.api_token.is_empty() {
        client_config = client_config.with_token(&config.api_token);
    }
    let api = Arc::new(BrewApi::new(&client_config)?);

    let mut terminal = Terminal::new(api, store, &config);
    terminal
        .load_catalog()
        .await
        .context("fetching the catalog")?;
    terminal.announce_pending()?;
    terminal.run().await?;

    tracing::info!("Brew terminal stopped");
    Ok(())
}
