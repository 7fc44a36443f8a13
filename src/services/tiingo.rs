// src/services/tiingo.rs
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned {status} for {url}")]
    NotFound { status: StatusCode, url: String },
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0:?} cannot be used as a path segment")]
    InvalidTicker(String),
    #[error("invalid upstream base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Client for the Tiingo company-metadata and IEX quote endpoints.
#[derive(Debug, Clone)]
pub struct TiingoClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TiingoClient {
    pub fn new(config: &AppConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.tiingo_base_url, &config.tiingo_token))
    }

    pub fn with_client(client: Client, base_url: &str, token: &str) -> Self {
        TiingoClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// `{base}/{prefix...}/{ticker}` with the ticker kept as one encoded segment.
    fn endpoint(&self, prefix: &[&str], ticker: &str) -> Result<Url, UpstreamError> {
        // Dot segments would be resolved away and change the route.
        if ticker.is_empty() || ticker == "." || ticker == ".." {
            return Err(UpstreamError::InvalidTicker(ticker.to_string()));
        }

        let invalid = |reason: String| UpstreamError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(prefix)
            .push(ticker);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/json")
            .send()
            .await
    }

    /// Company metadata for `ticker`. Any non-200 answer means the symbol is unknown.
    pub async fn fetch_company(&self, ticker: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["tiingo", "daily"], ticker)?;
        info!("Fetching company metadata from {}", url);

        let resp = self.get(url.clone()).await?;
        if resp.status() != StatusCode::OK {
            return Err(UpstreamError::NotFound { status: resp.status(), url: url.to_string() });
        }
        Ok(resp.json::<Value>().await?)
    }

    /// Latest IEX quote for `ticker`.
    ///
    /// Never fails: a transport error, a non-200 answer, a body that is not a
    /// list, or an empty list all degrade to `{}`.
    pub async fn fetch_latest_quote(&self, ticker: &str) -> Value {
        match self.try_fetch_quote(ticker).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                debug!("No quote data for {}", ticker);
                json!({})
            }
            Err(e) => {
                warn!("Quote lookup for {} failed, continuing without it: {}", ticker, e);
                json!({})
            }
        }
    }

    async fn try_fetch_quote(&self, ticker: &str) -> Result<Option<Value>, UpstreamError> {
        let url = self.endpoint(&["iex"], ticker)?;
        info!("Fetching latest quote from {}", url);

        let resp = self.get(url.clone()).await?;
        if resp.status() != StatusCode::OK {
            return Err(UpstreamError::NotFound { status: resp.status(), url: url.to_string() });
        }
        Ok(first_quote(resp.json::<Value>().await?))
    }
}

fn first_quote(body: Value) -> Option<Value> {
    match body {
        Value::Array(quotes) => quotes.into_iter().next(),
        _ => None,
    }
}
