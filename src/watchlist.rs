//! SQLite-backed watchlist store

use crate::{
    error::WatchlistError,
    types::{NewWatchlistEntry, WatchlistEntry},
};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Persisted list of coins the user chose to track
///
/// Every operation is a single auto-committed statement.
#[derive(Clone)]
pub struct WatchlistStore {
    pool: SqlitePool,
}

impl WatchlistStore {
    /// Opens (creating if missing) the database at `database_url` and ensures the schema
    pub async fn connect(database_url: &str) -> Result<Self, WatchlistError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // an in-memory database lives and dies with its single connection
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Creates the table and its coin_id index if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), WatchlistError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                coin_id VARCHAR(64) NOT NULL,
                name VARCHAR(128) NOT NULL DEFAULT '',
                symbol VARCHAR(32) NOT NULL DEFAULT '',
                price REAL NOT NULL DEFAULT 0,
                market_cap BIGINT NOT NULL DEFAULT 0,
                note VARCHAR(255) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_coin_id ON watchlist(coin_id);")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Saves a coin and returns the new row id
    pub async fn insert(&self, entry: &NewWatchlistEntry) -> Result<i64, WatchlistError> {
        let result = sqlx::query(
            "INSERT INTO watchlist (coin_id, name, symbol, price, market_cap, note, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.coin_id)
        .bind(&entry.name)
        .bind(&entry.symbol)
        .bind(entry.price)
        .bind(entry.market_cap)
        .bind(&entry.note)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, coin_id = %entry.coin_id, "Inserted watchlist entry");
        Ok(id)
    }

    /// All entries, newest first
    pub async fn list_all(&self) -> Result<Vec<WatchlistEntry>, WatchlistError> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT id, coin_id, name, symbol, price, market_cap, note, created_at \
             FROM watchlist ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<WatchlistEntry, WatchlistError> {
        sqlx::query_as::<_, WatchlistEntry>(
            "SELECT id, coin_id, name, symbol, price, market_cap, note, created_at \
             FROM watchlist WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(WatchlistError::NotFound(id))
    }

    pub async fn update_note(&self, id: i64, note: &str) -> Result<(), WatchlistError> {
        let result = sqlx::query("UPDATE watchlist SET note = ? WHERE id = ?")
            .bind(note)
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), id)
    }

    /// Overwrites price and market cap only; note and created_at stay as they are
    pub async fn update_price_and_cap(
        &self,
        id: i64,
        price: f64,
        market_cap: i64,
    ) -> Result<(), WatchlistError> {
        let result = sqlx::query("UPDATE watchlist SET price = ?, market_cap = ? WHERE id = ?")
            .bind(price)
            .bind(market_cap)
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), id)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), WatchlistError> {
        let result = sqlx::query("DELETE FROM watchlist WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected(), id)?;
        tracing::debug!(id, "Deleted watchlist entry");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn ensure_affected(rows: u64, id: i64) -> Result<(), WatchlistError> {
    if rows == 0 {
        Err(WatchlistError::NotFound(id))
    } else {
        Ok(())
    }
}
