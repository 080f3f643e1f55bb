//! Persistent dashboard state
//!
//! Small key/value store for settings, recent searches, and the location
//! permission decision. Records carry a schema version so a future layout
//! change degrades to defaults instead of failing deserialization.

use std::fmt::Debug;
use std::path::Path;

use fjall::Keyspace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::error::WeatherError;
use crate::Result;

pub const SETTINGS_KEY: &str = "settings";
pub const RECENTS_KEY: &str = "recent_searches";
pub const PERMISSION_KEY: &str = "location_permission";

const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct VersionedRecord<T> {
    version: u32,
    value: T,
}

/// Durable store for dashboard state, one JSON record per key
pub struct StateStore {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    let value = store
        .get(key)
        .map_err(|e| WeatherError::storage(e.to_string()))?;
    Ok(value.map(|v| v.to_vec()))
}

impl StateStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| WeatherError::storage(e.to_string()))?;
        let store = db
            .keyspace("state", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WeatherError::storage(e.to_string()))?;
        Ok(Self { store })
    }

    #[tracing::instrument(name = "put_state", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let record = VersionedRecord {
            version: SCHEMA_VERSION,
            value,
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| WeatherError::storage(e.to_string()))?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| WeatherError::storage(e.to_string()))?
            .map_err(|e| WeatherError::storage(e.to_string()))?;
        Ok(())
    }

    /// Read a record, returning `None` for missing keys, undecodable records,
    /// and records written under a different schema version
    #[tracing::instrument(name = "get_state", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes))
            .await
            .map_err(|e| WeatherError::storage(e.to_string()))??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        match serde_json::from_slice::<VersionedRecord<T>>(&bytes) {
            Ok(record) if record.version == SCHEMA_VERSION => Ok(Some(record.value)),
            Ok(record) => {
                tracing::warn!(
                    found = record.version,
                    expected = SCHEMA_VERSION,
                    "Discarding record with mismatched schema version"
                );
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(%err, "Discarding undecodable record");
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(|e| WeatherError::storage(e.to_string()))?
            .map_err(|e| WeatherError::storage(e.to_string()))?;
        Ok(())
    }
}
