use std::str::FromStr;

use alloy_primitives::Address;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::events::{AdapterEvent, EventSink};

/// An event as loaded back from the database.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub sequence: u64,
    pub adapter: String,
    pub pool: Address,
    pub event: AdapterEvent,
}

/// Persists every adapter event as a JSON row, keyed by adapter and sequence.
pub struct EventStore {
    pool: SqlitePool,
    adapter: String,
}

impl EventStore {
    pub async fn new(db_url: &str, adapter: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;
        Self::with_pool(pool, adapter).await
    }

    /// Single-connection in-memory store; every sqlite memory connection is its own database.
    pub async fn in_memory(adapter: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool, adapter).await
    }

    async fn with_pool(pool: SqlitePool, adapter: &str) -> Result<Self, sqlx::Error> {
        let store = Self {
            pool,
            adapter: adapter.to_string(),
        };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS adapter_events (
                adapter TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                name TEXT NOT NULL,
                pool TEXT NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (adapter, sequence)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn save_event(&self, sequence: u64, event: &AdapterEvent) -> Result<(), sqlx::Error> {
        let payload =
            serde_json::to_string(event).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(
            "INSERT OR REPLACE INTO adapter_events (adapter, sequence, name, pool, payload) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&self.adapter)
        .bind(sequence as i64)
        .bind(event.name())
        .bind(event.pool().to_string())
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Events of this adapter in emission order.
    pub async fn load_events(&self) -> Result<Vec<EventRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT sequence, adapter, pool, payload FROM adapter_events WHERE adapter = ? ORDER BY sequence",
        )
        .bind(&self.adapter)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let pool: String = row.get("pool");
            let payload: String = row.get("payload");
            records.push(EventRecord {
                sequence: row.get::<i64, _>("sequence") as u64,
                adapter: row.get("adapter"),
                pool: Address::from_str(&pool).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                event: serde_json::from_str(&payload)
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl EventSink for EventStore {
    async fn publish(&self, sequence: u64, event: &AdapterEvent) -> Result<(), String> {
        self.save_event(sequence, event)
            .await
            .map_err(|e| e.to_string())
    }
}
