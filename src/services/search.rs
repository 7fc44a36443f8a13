// src/services/search.rs
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use log::{debug, info};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CacheStatus, CachedEntry};

use super::db::DbStore;
use super::tiingo::{TiingoClient, UpstreamError};

/// How long a cached entry is served before the upstream is asked again.
pub const CACHE_TTL_MINUTES: i64 = 15;

/// Number of rows returned by the history endpoint.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no record found for {0}")]
    NotFound(String),
    #[error(transparent)]
    Upstream(UpstreamError),
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub company: Value,
    pub stock: Value,
    pub cache_status: CacheStatus,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a stored `last_updated` value. RFC 3339 is what this service
/// writes; naive ISO-8601 rows, with either `T` or a space between date and
/// time, are read as UTC.
pub fn parse_last_updated(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let rfc_err = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => return Ok(ts.with_timezone(&Utc)),
        Err(e) => e,
    };
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or(rfc_err)
}

/// Whether `entry` can be served as-is at `now`.
pub fn is_fresh(entry: &CachedEntry, now: DateTime<Utc>) -> Result<bool, chrono::ParseError> {
    let last_updated = parse_last_updated(&entry.last_updated)?;
    Ok(entry.stock.is_some() && now - last_updated < Duration::minutes(CACHE_TTL_MINUTES))
}

/// Serves `ticker` from the cache when fresh, otherwise from the upstream,
/// and records the search in the history either way.
///
/// On an upstream metadata failure nothing is written.
pub async fn lookup(
    db: &DbStore,
    upstream: &TiingoClient,
    ticker: &str,
) -> Result<LookupOutcome, SearchError> {
    let now = Utc::now();

    let cached = match db.get_cached_entry(ticker).await? {
        Some(entry) => match is_fresh(&entry, now) {
            Ok(true) => Some(entry),
            Ok(false) => {
                debug!("Cache entry for {} is stale or incomplete", ticker);
                None
            }
            // An unreadable timestamp only costs a refetch.
            Err(e) => {
                debug!("Unparseable cache timestamp {:?} for {}: {}", entry.last_updated, ticker, e);
                None
            }
        },
        None => None,
    };

    let outcome = match cached {
        Some(CachedEntry { company, stock: Some(stock), .. }) => {
            info!("Cache HIT for {}", ticker);
            LookupOutcome { company, stock, cache_status: CacheStatus::Hit }
        }
        _ => {
            info!("Cache MISS for {}", ticker);
            let company = match upstream.fetch_company(ticker).await {
                Ok(company) => company,
                Err(UpstreamError::NotFound { status, .. }) => {
                    info!("Upstream has no record for {} (status {})", ticker, status);
                    return Err(SearchError::NotFound(ticker.to_string()));
                }
                Err(UpstreamError::InvalidTicker(_)) => {
                    info!("{:?} cannot be looked up upstream", ticker);
                    return Err(SearchError::NotFound(ticker.to_string()));
                }
                Err(e) => return Err(SearchError::Upstream(e)),
            };
            let stock = upstream.fetch_latest_quote(ticker).await;

            db.upsert_cached_entry(&CachedEntry {
                ticker: ticker.to_string(),
                company: company.clone(),
                stock: Some(stock.clone()),
                last_updated: Utc::now().to_rfc3339(),
            })
            .await?;

            LookupOutcome { company, stock, cache_status: CacheStatus::Miss }
        }
    };

    db.append_history(ticker).await?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn entry_at(last_updated: &str) -> CachedEntry {
        CachedEntry {
            ticker: "AAPL".to_string(),
            company: json!({ "name": "Apple Inc" }),
            stock: Some(json!({ "last": 170.1 })),
            last_updated: last_updated.to_string(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 22, 12, 0, 0).unwrap()
    }

    #[test]
    fn fresh_within_window() {
        let entry = entry_at("2025-04-22T11:46:00+00:00");
        assert!(is_fresh(&entry, noon()).unwrap());
    }

    #[test]
    fn stale_at_exactly_fifteen_minutes() {
        let entry = entry_at("2025-04-22T11:45:00+00:00");
        assert!(!is_fresh(&entry, noon()).unwrap());
    }

    #[test]
    fn stale_after_sixteen_minutes() {
        let entry = entry_at("2025-04-22T11:44:00Z");
        assert!(!is_fresh(&entry, noon()).unwrap());
    }

    #[test]
    fn missing_stock_payload_is_never_fresh() {
        let mut entry = entry_at("2025-04-22T11:59:00+00:00");
        entry.stock = None;
        assert!(!is_fresh(&entry, noon()).unwrap());
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let parsed = parse_last_updated("2025-04-22T11:50:30.123456").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 4, 22, 11, 50, 30).unwrap()
            + Duration::microseconds(123456));
        assert!(is_fresh(&entry_at("2025-04-22T11:50:00"), noon()).unwrap());
    }

    #[test]
    fn space_separated_timestamps_are_accepted() {
        let parsed = parse_last_updated("2025-04-22 11:50:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 4, 22, 11, 50, 30).unwrap());
        assert!(is_fresh(&entry_at("2025-04-22 11:50:00.5"), noon()).unwrap());
        assert!(!is_fresh(&entry_at("2025-04-22 11:40:00"), noon()).unwrap());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = parse_last_updated("2025-04-22T07:55:00-04:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 4, 22, 11, 55, 0).unwrap());
    }

    #[test]
    fn garbage_timestamp_is_an_error() {
        assert!(is_fresh(&entry_at(""), noon()).is_err());
        assert!(is_fresh(&entry_at("yesterday"), noon()).is_err());
    }
}
