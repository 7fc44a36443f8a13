// src/services/db.rs
use anyhow::{Context, Result};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{CachedEntry, SearchHistoryRecord};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS SearchHistory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker TEXT NOT NULL,
        timestamp DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS CachedStockData (
        ticker TEXT PRIMARY KEY,
        company_json TEXT,
        stock_json TEXT,
        last_updated DATETIME
    );
"#;

/// SQLite-backed cache and search history.
///
/// Holds only the database path: every operation opens its own connection on
/// the blocking pool and closes it when done, leaving writer serialization to
/// SQLite.
#[derive(Debug, Clone)]
pub struct DbStore {
    path: PathBuf,
}

impl DbStore {
    /// Opens the database at `path` and creates the tables if needed.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        store
            .run(|conn| {
                conn.execute_batch(SCHEMA).context("Failed to create schema")?;
                Ok(())
            })
            .await?;
        debug!("Database ready at {}", store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;
        Ok(conn)
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Self::connect(&path)?;
            op(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Reads the cached row for `ticker`.
    ///
    /// A row whose company payload is missing, `null` or not valid JSON is
    /// reported as absent. A `null` or unreadable stock payload comes back as
    /// `None`, which callers treat like any other incomplete entry.
    pub async fn get_cached_entry(&self, ticker: &str) -> Result<Option<CachedEntry>> {
        let ticker = ticker.to_string();
        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT company_json, stock_json, last_updated \
                     FROM CachedStockData WHERE ticker = ?1",
                    params![ticker],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, Option<String>>(1)?,
                            row.get::<_, Option<String>>(2)?,
                        ))
                    },
                )
                .optional()
                .context("Failed to query cached entry")?;

            let Some((company_json, stock_json, last_updated)) = row else {
                return Ok(None);
            };

            let company = match company_json.as_deref().map(serde_json::from_str::<Value>) {
                Some(Ok(Value::Null)) | None => return Ok(None),
                Some(Ok(value)) => value,
                Some(Err(e)) => {
                    warn!("Discarding cached company payload for {}: {}", ticker, e);
                    return Ok(None);
                }
            };

            let stock = stock_json
                .filter(|json| !json.is_empty())
                .and_then(|json| match serde_json::from_str::<Value>(&json) {
                    Ok(Value::Null) => None,
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("Discarding cached stock payload for {}: {}", ticker, e);
                        None
                    }
                });

            Ok(Some(CachedEntry {
                ticker,
                company,
                stock,
                last_updated: last_updated.unwrap_or_default(),
            }))
        })
        .await
    }

    /// Inserts or overwrites the cached row for `entry.ticker`.
    pub async fn upsert_cached_entry(&self, entry: &CachedEntry) -> Result<()> {
        let company_json = serde_json::to_string(&entry.company)?;
        let stock_json = entry.stock.as_ref().map(serde_json::to_string).transpose()?;
        let ticker = entry.ticker.clone();
        let last_updated = entry.last_updated.clone();

        self.run(move |conn| {
            conn.execute(
                r#"
                INSERT INTO CachedStockData (ticker, company_json, stock_json, last_updated)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(ticker) DO UPDATE SET
                    company_json = excluded.company_json,
                    stock_json   = excluded.stock_json,
                    last_updated = excluded.last_updated
                "#,
                params![ticker, company_json, stock_json, last_updated],
            )
            .context("Failed to upsert cached entry")?;
            Ok(())
        })
        .await
    }

    /// Appends a history row; the timestamp is filled in by SQLite.
    pub async fn append_history(&self, ticker: &str) -> Result<()> {
        let ticker = ticker.to_string();
        self.run(move |conn| {
            conn.execute("INSERT INTO SearchHistory (ticker) VALUES (?1)", params![ticker])
                .context("Failed to append search history")?;
            Ok(())
        })
        .await
    }

    /// Newest-first history, at most `limit` rows. Rows sharing a timestamp
    /// (one-second resolution) are ordered by insertion.
    pub async fn recent_history(&self, limit: usize) -> Result<Vec<SearchHistoryRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT ticker, timestamp FROM SearchHistory \
                     ORDER BY timestamp DESC, id DESC LIMIT ?1",
                )
                .context("Failed to prepare history query")?;

            let records = stmt
                .query_map(params![limit], |row| {
                    Ok(SearchHistoryRecord {
                        ticker: row.get(0)?,
                        timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    })
                })
                .context("Failed to query search history")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to read search history")?;

            Ok(records)
        })
        .await
    }
}
