// src/bin/setup_db.rs
use dotenv::dotenv;
use log::info;
use std::env;

use ticker_search_backend::config::DEFAULT_DB_PATH;
use ticker_search_backend::services::db::DbStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let db_path = env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    info!("Creating schema in {}", db_path);

    DbStore::new(db_path.as_str()).await?;

    println!("Database setup complete!");
    Ok(())
}
