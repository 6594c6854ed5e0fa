//! # cf-ledger-sqlite Implementation
//!
//! Stores world state in a single `world_state(key, value)` table and maps
//! every ledger transaction onto one SQL transaction. SQLite's isolation gives
//! the all-or-nothing behaviour the contract relies on.

use std::str::FromStr;

use anyhow::anyhow;
use async_trait::async_trait;
use cf_core::traits::{Ledger, LedgerTxn, StateStub};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Transaction};
use tokio::sync::Mutex;

const SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS world_state (key TEXT PRIMARY KEY NOT NULL, value BLOB NOT NULL)";

pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Opens (or creates) the database at `url` and ensures the schema exists.
    ///
    /// # Developer Note
    /// An in-memory database lives inside a single connection, so the pool is
    /// pinned to one connection that never expires for `:memory:` URLs.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;

        log::info!("sqlite ledger ready at {}", url);
        Ok(Self { pool })
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn begin(&self) -> anyhow::Result<Box<dyn LedgerTxn>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTxn { tx: Mutex::new(Some(tx)) }))
    }
}

/// One open SQL transaction. Dropping it rolls back.
pub struct SqliteTxn {
    tx: Mutex<Option<Transaction<'static, Sqlite>>>,
}

#[async_trait]
impl StateStub for SqliteTxn {
    async fn get_state(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(|| anyhow!("transaction already finished"))?;

        let row = sqlx::query("SELECT value FROM world_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(row.map(|row| row.get::<Vec<u8>, _>("value")))
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(|| anyhow!("transaction already finished"))?;

        sqlx::query(
            "INSERT INTO world_state (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerTxn for SqliteTxn {
    fn stub(&self) -> &dyn StateStub {
        self
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let tx = self
            .tx
            .into_inner()
            .ok_or_else(|| anyhow!("transaction already finished"))?;
        tx.commit().await?;
        Ok(())
    }
}
