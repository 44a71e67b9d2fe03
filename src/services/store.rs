//! Persistence gateway for RFC summaries and aggregates.
//!
//! Everything is stored as JSON text in a key-value layout: one list-valued
//! key for all summaries and one key per aggregate. Readers treat a missing
//! key as "nothing stored yet".

use crate::db::{self, kv_store, pool::DbPool};
use crate::error::AppError;
use crate::models::{RfcAggregate, RfcSummary};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Key holding the list of all summaries.
pub const SUMMARIES_KEY: &str = "rfcs";

/// Prefix of per-RFC aggregate keys.
pub const AGGREGATE_KEY_PREFIX: &str = "rfc_";

/// Storage key of an aggregate.
pub fn aggregate_key(id: &str) -> String {
    format!("{}{}", AGGREGATE_KEY_PREFIX, id)
}

/// Durable storage keyed by RFC identifier.
#[async_trait]
pub trait RfcStore: Send + Sync {
    async fn load_summaries(&self) -> Result<Vec<RfcSummary>, AppError>;

    async fn save_summaries(&self, summaries: &[RfcSummary]) -> Result<(), AppError>;

    async fn load_aggregate(&self, id: &str) -> Result<Option<RfcAggregate>, AppError>;

    async fn save_aggregate(&self, rfc: &RfcAggregate) -> Result<(), AppError>;

    async fn delete_aggregate(&self, id: &str) -> Result<(), AppError>;
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        AppError::storage_with_op(format!("Corrupt value under '{}': {}", key, e), "load")
    })
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteRfcStore {
    pool: DbPool,
}

impl SqliteRfcStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open the database under `data_dir`, creating and migrating it as needed.
    pub async fn open(data_dir: &Path) -> Result<Self, AppError> {
        let pool = db::initialize(&db::get_db_path(data_dir)).await?;
        log::info!("Opened RFC store in {}", data_dir.display());
        Ok(Self::new(pool))
    }

    /// Identifiers of every stored aggregate.
    pub async fn stored_ids(&self) -> Result<Vec<String>, AppError> {
        let keys = kv_store::keys_with_prefix(&self.pool, AGGREGATE_KEY_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(AGGREGATE_KEY_PREFIX).map(str::to_string))
            .collect())
    }
}

#[async_trait]
impl RfcStore for SqliteRfcStore {
    async fn load_summaries(&self) -> Result<Vec<RfcSummary>, AppError> {
        match kv_store::get_value(&self.pool, SUMMARIES_KEY).await? {
            Some(raw) => decode(SUMMARIES_KEY, &raw),
            None => Ok(Vec::new()),
        }
    }

    async fn save_summaries(&self, summaries: &[RfcSummary]) -> Result<(), AppError> {
        let json = serde_json::to_string(summaries)?;
        kv_store::set_value(&self.pool, SUMMARIES_KEY, &json).await
    }

    async fn load_aggregate(&self, id: &str) -> Result<Option<RfcAggregate>, AppError> {
        let key = aggregate_key(id);
        kv_store::get_value(&self.pool, &key)
            .await?
            .map(|raw| decode(&key, &raw))
            .transpose()
    }

    async fn save_aggregate(&self, rfc: &RfcAggregate) -> Result<(), AppError> {
        let json = serde_json::to_string(rfc)?;
        kv_store::set_value(&self.pool, &aggregate_key(&rfc.id), &json).await
    }

    async fn delete_aggregate(&self, id: &str) -> Result<(), AppError> {
        kv_store::delete_value(&self.pool, &aggregate_key(id)).await
    }
}

/// In-memory store holding the same JSON text a durable store would.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryRfcStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRfcStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw JSON stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::internal("Memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: String, value: Option<String>) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage_with_op("Write rejected", "save"));
        }

        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::internal("Memory store lock poisoned"))?;
        match value {
            Some(value) => values.insert(key, value),
            None => values.remove(&key),
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RfcStore for MemoryRfcStore {
    async fn load_summaries(&self) -> Result<Vec<RfcSummary>, AppError> {
        match self.get(SUMMARIES_KEY)? {
            Some(raw) => decode(SUMMARIES_KEY, &raw),
            None => Ok(Vec::new()),
        }
    }

    async fn save_summaries(&self, summaries: &[RfcSummary]) -> Result<(), AppError> {
        let json = serde_json::to_string(summaries)?;
        self.put(SUMMARIES_KEY.to_string(), Some(json))
    }

    async fn load_aggregate(&self, id: &str) -> Result<Option<RfcAggregate>, AppError> {
        let key = aggregate_key(id);
        self.get(&key)?.map(|raw| decode(&key, &raw)).transpose()
    }

    async fn save_aggregate(&self, rfc: &RfcAggregate) -> Result<(), AppError> {
        let json = serde_json::to_string(rfc)?;
        self.put(aggregate_key(&rfc.id), Some(json))
    }

    async fn delete_aggregate(&self, id: &str) -> Result<(), AppError> {
        self.put(aggregate_key(id), None)
    }
}

/// Replace the summary with the same id as `summary`, or append it.
pub fn upsert_summary(summaries: &mut Vec<RfcSummary>, summary: RfcSummary) {
    match summaries.iter_mut().find(|s| s.id == summary.id) {
        Some(existing) => *existing = summary,
        None => summaries.push(summary),
    }
}

/// Persist an aggregate and refresh its row in the summary list.
pub async fn save_with_summary(store: &dyn RfcStore, rfc: &RfcAggregate) -> Result<(), AppError> {
    store.save_aggregate(rfc).await?;

    let mut summaries = store.load_summaries().await?;
    upsert_summary(&mut summaries, rfc.summary());
    store.save_summaries(&summaries).await
}

/// Remove an aggregate and its summary.
pub async fn delete_with_summary(store: &dyn RfcStore, id: &str) -> Result<(), AppError> {
    let mut summaries = store.load_summaries().await?;
    summaries.retain(|s| s.id != id);
    store.save_summaries(&summaries).await?;
    store.delete_aggregate(id).await
}
