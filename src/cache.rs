use anyhow::{Result, anyhow};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

struct StoredEntry {
    bytes: Vec<u8>,
    expires_at: u128, // Unix timestamp (milliseconds)
}

/// In-memory response cache with per-entry time-to-live.
///
/// Readers share the lock. Each insert also sweeps out every expired entry.
#[derive(Default)]
pub struct ResponseCache {
    store: RwLock<HashMap<String, StoredEntry>>,
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis())
}

impl ResponseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let now = now_millis()?;
        let expires_at = now
            .checked_add(ttl.as_millis())
            .ok_or(anyhow!("TTL overflow"))?;
        let bytes = serde_json::to_vec(value)?;

        let mut store = self
            .store
            .write()
            .map_err(|_| anyhow!("Cache lock poisoned"))?;
        let before = store.len();
        store.retain(|_, entry| now < entry.expires_at);
        let swept = before - store.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired entries");
        }
        store.insert(key.to_string(), StoredEntry { bytes, expires_at });
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let now = now_millis()?;
        let fresh = {
            let store = self.store.read().map_err(|_| anyhow!("Cache lock poisoned"))?;
            match store.get(key) {
                Some(entry) if now < entry.expires_at => {
                    Some(serde_json::from_slice::<T>(&entry.bytes)?)
                }
                Some(_) => None,
                None => {
                    tracing::debug!("Key not found");
                    return Ok(None);
                }
            }
        };

        match fresh {
            Some(value) => {
                tracing::debug!("Key found and still fresh");
                Ok(Some(value))
            }
            None => {
                tracing::debug!("Key found but expired");
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    /// Manually removes a key from the cache.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store
            .write()
            .map_err(|_| anyhow!("Cache lock poisoned"))?
            .remove(key);
        Ok(())
    }

    /// Number of stored entries, fresh or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
