//! `ModelRepository`: the data-access abstraction the core consumes (§4.6).
//!
//! Modeled the way the voice agent's `SessionStore` trait is modeled — an
//! `async_trait` with one in-memory reference implementation backed by a
//! `parking_lot::RwLock<HashMap<..>>`. A durable backend (SQL, etc.) is out
//! of scope; any future implementation plugs in behind the same trait.

pub mod error;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use llm_gateway_core::{ConnectStatus, ModelRecord, ModelStatus, QuotaStat};
use parking_lot::RwLock;

pub use error::{RepositoryError, RepositoryResult};

/// Optional filters for `list`; `None` means "don't filter on this field".
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    pub vendor: Option<String>,
    pub status: Option<ModelStatus>,
}

impl ModelFilter {
    fn matches(&self, record: &ModelRecord) -> bool {
        if let Some(v) = &self.vendor {
            if &record.vendor != v {
                return false;
            }
        }
        if let Some(s) = self.status {
            if record.status != s {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ModelRepository: Send + Sync {
    async fn list(&self, filter: ModelFilter) -> RepositoryResult<Vec<ModelRecord>>;
    async fn get(&self, id: u64) -> RepositoryResult<ModelRecord>;
    async fn create(&self, record: ModelRecord) -> RepositoryResult<ModelRecord>;
    async fn update(&self, record: ModelRecord) -> RepositoryResult<ModelRecord>;
    async fn delete(&self, id: u64) -> RepositoryResult<()>;

    /// The specific query dispatch uses: enabled and reachable records,
    /// ordered by priority ascending, tie-broken by id ascending (§4.2
    /// step 1).
    async fn list_candidates(&self) -> RepositoryResult<Vec<ModelRecord>>;

    /// Marks `connect_status` after a connectivity probe (§4.4). Per-row
    /// atomicity: implementations must serialize this read-modify-write
    /// per model id.
    async fn set_connect_status(&self, id: u64, status: ConnectStatus) -> RepositoryResult<()>;

    async fn get_quota(&self, model_id: u64) -> RepositoryResult<Option<QuotaStat>>;

    /// Applies newly consumed tokens to the model's quota row and
    /// recomputes `quota_status` on the record, atomically per model id
    /// (§4.7, §5).
    async fn add_quota_usage(&self, model_id: u64, total_tokens: u64, alert_threshold: f64) -> RepositoryResult<()>;
}

struct Inner {
    records: HashMap<u64, ModelRecord>,
    quotas: HashMap<u64, QuotaStat>,
}

/// In-memory reference implementation, analogous to
/// `InMemorySessionStore`. One `RwLock` guards both maps; a per-model-id
/// critical section inside each mutator satisfies the "serialized per
/// model-id" requirement from §5 since the whole structure is tiny and a
/// single short-held write lock never blocks concurrent readers for long.
pub struct InMemoryModelRepository {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
}

impl Default for InMemoryModelRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryModelRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner { records: HashMap::new(), quotas: HashMap::new() }),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ModelRepository for InMemoryModelRepository {
    async fn list(&self, filter: ModelFilter) -> RepositoryResult<Vec<ModelRecord>> {
        let inner = self.inner.read();
        Ok(inner.records.values().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn get(&self, id: u64) -> RepositoryResult<ModelRecord> {
        let inner = self.inner.read();
        inner.records.get(&id).cloned().ok_or(RepositoryError::NotFound(id))
    }

    async fn create(&self, mut record: ModelRecord) -> RepositoryResult<ModelRecord> {
        let mut inner = self.inner.write();
        if inner
            .records
            .values()
            .any(|r| r.vendor == record.vendor && r.model_name == record.model_name)
        {
            return Err(RepositoryError::DuplicateVendorModel {
                vendor: record.vendor,
                model_name: record.model_name,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.id = id;
        record.create_time = Utc::now();
        record.update_time = record.create_time;
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: ModelRecord) -> RepositoryResult<ModelRecord> {
        let mut inner = self.inner.write();
        if !inner.records.contains_key(&record.id) {
            return Err(RepositoryError::NotFound(record.id));
        }
        record.update_time = Utc::now();
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: u64) -> RepositoryResult<()> {
        let mut inner = self.inner.write();
        inner.records.remove(&id).ok_or(RepositoryError::NotFound(id))?;
        inner.quotas.remove(&id);
        Ok(())
    }

    async fn list_candidates(&self) -> RepositoryResult<Vec<ModelRecord>> {
        let inner = self.inner.read();
        let mut candidates: Vec<ModelRecord> = inner.records.values().filter(|r| r.is_eligible()).cloned().collect();
        candidates.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Ok(candidates)
    }

    async fn set_connect_status(&self, id: u64, status: ConnectStatus) -> RepositoryResult<()> {
        let mut inner = self.inner.write();
        let record = inner.records.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        record.connect_status = status;
        record.update_time = Utc::now();
        Ok(())
    }

    async fn get_quota(&self, model_id: u64) -> RepositoryResult<Option<QuotaStat>> {
        let inner = self.inner.read();
        Ok(inner.quotas.get(&model_id).cloned())
    }

    async fn add_quota_usage(&self, model_id: u64, total_tokens: u64, alert_threshold: f64) -> RepositoryResult<()> {
        let mut inner = self.inner.write();
        let stat = inner.quotas.entry(model_id).or_insert_with(|| QuotaStat::new(model_id, 0.0));
        stat.add_usage(total_tokens);
        let new_status = stat.quota_status(alert_threshold);
        if let Some(record) = inner.records.get_mut(&model_id) {
            record.quota_status = new_status;
            record.update_time = Utc::now();
        }
        Ok(())
    }
}
