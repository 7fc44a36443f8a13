// src/handlers/history.rs
use log::{debug, error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::search::HISTORY_LIMIT;
use crate::state::AppState;

pub async fn get_history(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request to get search history");

    let records = state.db.recent_history(HISTORY_LIMIT).await.map_err(|e| {
        error!("Database error: {:#}", e);
        warp::reject::custom(ApiError::database_error(e.to_string()))
    })?;

    debug!("Returning {} history records", records.len());
    Ok(warp::reply::json(&records))
}
