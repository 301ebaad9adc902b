use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgListener, PgPool};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::storage::{KeyValueStorage, StorageEvent};
use crate::error::AppResult;

const NOTIFY_CHANNEL: &str = "kv_store_changes";
const EVENT_CAPACITY: usize = 256;

/// Key/value storage in a Postgres table. Every write is announced with
/// `pg_notify`, so processes sharing the database see each other's changes.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
    events: broadcast::Sender<StorageEvent>,
}

impl PgStorage {
    /// Starts listening for change notifications before returning.
    pub async fn connect(pool: PgPool) -> AppResult<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        let sender = events.clone();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<StorageEvent>(notification.payload()) {
                            Ok(event) => {
                                let _ = sender.send(event);
                            }
                            Err(e) => {
                                tracing::warn!("Ignoring malformed storage notification: {}", e)
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Storage listener error: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        tracing::info!("Listening for storage changes on '{}'", NOTIFY_CHANNEL);
        Ok(Self { pool, events })
    }

    async fn notify(&self, key: &str, origin: Uuid) -> AppResult<()> {
        let payload = serde_json::to_string(&StorageEvent {
            key: key.to_string(),
            origin,
        })?;

        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NOTIFY_CHANNEL)
            .bind(payload)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for PgStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: String, origin: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        self.notify(key, origin).await
    }

    async fn remove(&self, key: &str, origin: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            self.notify(key, origin).await?;
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
