mod error;
mod routes;

use std::path::Path;

use anyhow::Context;
use tokio::sync::Mutex;

use banka::{config::AppConfig, logging};
use routes::AppState;

const SERVER_CONFIG: &str = "resources/server.toml";

fn read_config() -> anyhow::Result<AppConfig> {
    let path = std::env::var("BANKA_CONFIG").unwrap_or_else(|_| SERVER_CONFIG.to_owned());
    if Path::new(&path).exists() {
        return AppConfig::read(&path);
    }
    log::warn!("{} not found, using default configuration", path);
    return Ok(AppConfig::default());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = read_config()?;
    let rates = config.rates.provider()?;
    let ledger = config.open_ledger();
    log::info!("ledger {} opened, balance {:.2}", config.storage.path.display(), ledger.balance());

    let app = routes::router(AppState {
        ledger: Mutex::new(ledger),
        currencies: config.currency.clone(),
        rates
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
