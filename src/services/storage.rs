use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::error::AppResult;

/// Keys of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Properties,
    Payments,
    Complaints,
    Tenants,
    CurrentUser,
}

impl StorageKey {
    /// The four collection keys, in load order.
    pub const COLLECTIONS: [StorageKey; 4] = [
        StorageKey::Properties,
        StorageKey::Payments,
        StorageKey::Complaints,
        StorageKey::Tenants,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Properties => "properties",
            StorageKey::Payments => "payments",
            StorageKey::Complaints => "complaints",
            StorageKey::Tenants => "tenants",
            StorageKey::CurrentUser => "currentUser",
        }
    }

    pub fn is_collection(self) -> bool {
        !matches!(self, StorageKey::CurrentUser)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "properties" => Ok(StorageKey::Properties),
            "payments" => Ok(StorageKey::Payments),
            "complaints" => Ok(StorageKey::Complaints),
            "tenants" => Ok(StorageKey::Tenants),
            "currentUser" => Ok(StorageKey::CurrentUser),
            other => Err(format!("unknown storage key: {}", other)),
        }
    }
}

/// Change notification for one key. `origin` is the writer, so a store can skip
/// its own writes and react only to other instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    pub key: String,
    pub origin: Uuid,
}

/// Durable string key/value storage shared by every store instance.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: String, origin: Uuid) -> AppResult<()>;

    async fn remove(&self, key: &str, origin: Uuid) -> AppResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

const EVENT_CAPACITY: usize = 256;

/// In-process storage. Clones share the same map and change feed.
#[derive(Clone)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    fn notify(&self, key: &str, origin: Uuid) {
        // No receivers is fine: nobody else is open.
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            origin,
        });
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, origin: Uuid) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        self.notify(key, origin);
        Ok(())
    }

    async fn remove(&self, key: &str, origin: Uuid) -> AppResult<()> {
        let removed = self.entries.write().await.remove(key);
        if removed.is_some() {
            self.notify(key, origin);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}
