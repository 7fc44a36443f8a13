use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use ticker_search_backend::config::AppConfig;
use ticker_search_backend::routes;
use ticker_search_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {:#}", e);
        e
    })?;

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let state = Arc::new(AppState::new(config).await?);
    info!("Database initialized at {}", state.db.path().display());

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(state).with(cors).with(warp::log("ticker_search_backend"));
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api)
        .run(addr)
        .await;

    Ok(())
}
