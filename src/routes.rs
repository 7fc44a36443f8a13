// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;
use log::{debug, info};
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{history::get_history, search::search_stock};
use crate::models::SearchQuery;
use crate::state::AppState;

// Every rejection is answered with a JSON `{"error": ...}` body.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: &str;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = &api_error.message;
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string";
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed";
    } else {
        debug!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let static_dir = state.config.static_dir.clone();
    let state_filter = warp::any().map(move || state.clone());

    let search_route = warp::path!("search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(state_filter.clone())
        .and_then(search_stock);

    let history_route = warp::path!("history")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_history);

    let index_route = warp::path::end()
        .and(warp::get())
        .and(warp::fs::file(static_dir.join("index.html")));

    let static_route = warp::path("static")
        .and(warp::get())
        .and(warp::fs::dir(static_dir));

    info!("All routes configured successfully.");

    search_route
        .or(history_route)
        .or(index_route)
        .or(static_route)
        .recover(handle_rejection)
}
