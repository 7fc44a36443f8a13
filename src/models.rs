// src/models.rs
use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::fmt;

/// Uppercases and trims a raw ticker; `None` when nothing is left.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the ticker cache. Payloads are passed through untouched;
/// `last_updated` is kept as stored so the freshness check owns its parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
    pub ticker: String,
    pub company: Value,
    pub stock: Option<Value>,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryRecord {
    pub ticker: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub ticker: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub company: Value,
    pub stock: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_ticker("  aapl \n"), Some("AAPL".to_string()));
        assert_eq!(normalize_ticker("Brk.B"), Some("BRK.B".to_string()));
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(normalize_ticker(""), None);
        assert_eq!(normalize_ticker(" \t "), None);
    }

    #[test]
    fn cache_status_header_values() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.to_string(), "MISS");
    }
}
