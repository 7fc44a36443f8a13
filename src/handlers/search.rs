// src/handlers/search.rs
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};
use warp::Rejection;

use super::error::ApiError;
use crate::models::{normalize_ticker, CacheStatus, SearchQuery, SearchResponse};
use crate::services::search::{lookup, SearchError};
use crate::state::AppState;

pub const TICKER_REQUIRED: &str = "Ticker is required";
pub const NO_RECORD_FOUND: &str = "Error: No record has been found, please enter a valid symbol.";

pub async fn search_stock(query: SearchQuery, state: Arc<AppState>) -> Result<Response, Rejection> {
    let Some(ticker) = query.ticker.as_deref().and_then(normalize_ticker) else {
        warn!("Rejecting search without a ticker");
        return Ok(reply::with_status(
            reply::json(&json!({ "error": TICKER_REQUIRED })),
            StatusCode::BAD_REQUEST,
        )
        .into_response());
    };
    info!("Handling search for {}", ticker);

    match lookup(&state.db, &state.upstream, &ticker).await {
        Ok(outcome) => {
            let body = SearchResponse {
                company: outcome.company,
                stock: outcome.stock,
            };
            Ok(reply::with_header(reply::json(&body), "X-Cache", outcome.cache_status.as_str())
                .into_response())
        }
        // The front end branches on `error` in the body, not on the status.
        Err(SearchError::NotFound(_)) => Ok(reply::with_header(
            reply::json(&json!({ "error": NO_RECORD_FOUND })),
            "X-Cache",
            CacheStatus::Miss.as_str(),
        )
        .into_response()),
        Err(SearchError::Upstream(e)) => {
            error!("Upstream lookup for {} failed: {}", ticker, e);
            Err(warp::reject::custom(ApiError::upstream_unavailable()))
        }
        Err(SearchError::Store(e)) => {
            error!("Database error during search for {}: {:#}", ticker, e);
            Err(warp::reject::custom(ApiError::database_error(e.to_string())))
        }
    }
}
