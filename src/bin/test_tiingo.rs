// src/bin/test_tiingo.rs
use log::{error, info};
use std::env;

use ticker_search_backend::config::AppConfig;
use ticker_search_backend::models::normalize_ticker;
use ticker_search_backend::services::tiingo::TiingoClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let raw = env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    let ticker = normalize_ticker(&raw).ok_or_else(|| anyhow::anyhow!("ticker must not be blank"))?;

    let config = AppConfig::from_env()?;
    let client = TiingoClient::new(&config)?;

    info!("Testing Tiingo lookups for {}...", ticker);

    match client.fetch_company(&ticker).await {
        Ok(company) => println!("Company: {}", serde_json::to_string_pretty(&company)?),
        Err(e) => {
            error!("ERROR: company lookup failed: {}", e);
            return Err(e.into());
        }
    }

    let quote = client.fetch_latest_quote(&ticker).await;
    println!("Quote:   {}", serde_json::to_string_pretty(&quote)?);

    Ok(())
}
