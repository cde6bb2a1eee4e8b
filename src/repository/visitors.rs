//! Visitors repository: the document-store seam and its in-memory backend

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use crate::{
    error::{AppError, AppResult},
    models::visitor::{Visitor, VisitorFilter, VisitorPatch},
};

/// Document store holding visitor records, keyed by visitor ID
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitorStore: Send + Sync {
    /// Get a visitor by ID
    async fn get(&self, id: &str) -> AppResult<Visitor>;

    /// List visitors matching the filter, in insertion order
    async fn list(&self, filter: VisitorFilter) -> AppResult<Vec<Visitor>>;

    /// Create a new record. Fails with a conflict if the ID is taken.
    async fn create(&self, visitor: Visitor) -> AppResult<Visitor>;

    /// Apply a partial update and return the updated record. A patch that
    /// sets the time out of a checked-out record is a conflict.
    async fn update(&self, id: &str, patch: VisitorPatch) -> AppResult<Visitor>;

    /// Record a departure at `at`. Conflict if the visitor has already left.
    async fn check_out(&self, id: &str, at: DateTime<Utc>) -> AppResult<Visitor>;

    /// Observe all records matching the filter
    async fn subscribe(&self, filter: VisitorFilter) -> AppResult<VisitorSubscription>;
}

/// Live query over the store. Dropping it releases the subscription.
pub struct VisitorSubscription {
    filter: VisitorFilter,
    rx: watch::Receiver<Arc<Vec<Visitor>>>,
}

impl VisitorSubscription {
    pub fn new(filter: VisitorFilter, rx: watch::Receiver<Arc<Vec<Visitor>>>) -> Self {
        Self { filter, rx }
    }

    pub fn filter(&self) -> VisitorFilter {
        self.filter
    }

    /// Current matching set
    pub fn current(&self) -> Vec<Visitor> {
        select(&self.rx.borrow(), self.filter)
    }

    /// Wait for the next change and return the new matching set.
    /// Returns `None` once the store has gone away.
    pub async fn changed(&mut self) -> Option<Vec<Visitor>> {
        self.rx.changed().await.ok()?;
        Some(select(&self.rx.borrow_and_update(), self.filter))
    }

    /// Stream of matching sets, starting with the current one
    pub fn into_stream(self) -> impl Stream<Item = Vec<Visitor>> + Send + 'static {
        let filter = self.filter;
        WatchStream::new(self.rx).map(move |snapshot| select(&snapshot, filter))
    }
}

fn already_checked_out(id: &str) -> AppError {
    AppError::Conflict(format!("Visitor with id {} is already checked out", id))
}

fn select(snapshot: &[Visitor], filter: VisitorFilter) -> Vec<Visitor> {
    snapshot.iter().filter(|v| filter.matches(v)).cloned().collect()
}

/// In-memory store publishing a full snapshot to subscribers on every write
pub struct MemoryVisitorStore {
    records: RwLock<IndexMap<String, Visitor>>,
    updates: watch::Sender<Arc<Vec<Visitor>>>,
}

impl Default for MemoryVisitorStore {
    fn default() -> Self {
        Self::with_records(IndexMap::new())
    }
}

impl MemoryVisitorStore {
    fn with_records(records: IndexMap<String, Visitor>) -> Self {
        let snapshot: Arc<Vec<Visitor>> = Arc::new(records.values().cloned().collect());
        let (updates, _) = watch::channel(snapshot);
        Self {
            records: RwLock::new(records),
            updates,
        }
    }

    /// Build a store from raw backend documents. Each document carries its
    /// key in an `id` field; documents without one, or that are not objects,
    /// are skipped.
    pub fn from_documents(documents: impl IntoIterator<Item = Value>, now: DateTime<Utc>) -> Self {
        let mut records = IndexMap::new();
        for doc in documents {
            let Some(id) = doc.get("id").and_then(Value::as_str).map(str::to_string) else {
                tracing::warn!("Skipping visitor document without id");
                continue;
            };
            match Visitor::from_document(id.clone(), &doc, now) {
                Ok(visitor) => {
                    records.insert(id, visitor);
                }
                Err(e) => tracing::warn!("Skipping visitor document {}: {}", id, e),
            }
        }
        Self::with_records(records)
    }

    /// Load documents from a JSON file holding either an array of documents
    /// or an object keyed by document ID
    pub async fn load_seed_file(path: impl AsRef<Path>, now: DateTime<Utc>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Store(format!("Failed to read {}: {}", path.display(), e)))?;
        let value: Value = serde_json::from_str(&raw)?;

        let documents: Vec<Value> = match value {
            Value::Array(docs) => docs,
            Value::Object(map) => map
                .into_iter()
                .map(|(id, mut doc)| {
                    if let Value::Object(fields) = &mut doc {
                        fields.entry("id").or_insert(Value::String(id));
                    }
                    doc
                })
                .collect(),
            _ => {
                return Err(AppError::Validation(
                    "Seed file must contain an array or an object of documents".to_string(),
                ))
            }
        };

        let store = Self::from_documents(documents, now);
        tracing::info!(
            "Seeded {} visitors from {}",
            store.records.read().await.len(),
            path.display()
        );
        Ok(store)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.updates.receiver_count()
    }

    fn publish(&self, records: &IndexMap<String, Visitor>) {
        self.updates
            .send_replace(Arc::new(records.values().cloned().collect()));
    }
}

#[async_trait]
impl VisitorStore for MemoryVisitorStore {
    async fn get(&self, id: &str) -> AppResult<Visitor> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Visitor with id {} not found", id)))
    }

    async fn list(&self, filter: VisitorFilter) -> AppResult<Vec<Visitor>> {
        let records = self.records.read().await;
        Ok(records.values().filter(|v| filter.matches(v)).cloned().collect())
    }

    async fn create(&self, visitor: Visitor) -> AppResult<Visitor> {
        let mut records = self.records.write().await;
        if records.contains_key(&visitor.id) {
            return Err(AppError::Conflict(format!(
                "Visitor with id {} already exists",
                visitor.id
            )));
        }
        records.insert(visitor.id.clone(), visitor.clone());
        self.publish(&records);
        Ok(visitor)
    }

    async fn update(&self, id: &str, patch: VisitorPatch) -> AppResult<Visitor> {
        let mut records = self.records.write().await;
        let visitor = records
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Visitor with id {} not found", id)))?;
        if patch.time_out.is_some() && visitor.is_checked_out {
            return Err(already_checked_out(id));
        }
        visitor.apply(&patch);
        let updated = visitor.clone();
        self.publish(&records);
        Ok(updated)
    }

    async fn check_out(&self, id: &str, at: DateTime<Utc>) -> AppResult<Visitor> {
        self.update(id, VisitorPatch::check_out(at)).await
    }

    async fn subscribe(&self, filter: VisitorFilter) -> AppResult<VisitorSubscription> {
        Ok(VisitorSubscription::new(filter, self.updates.subscribe()))
    }
}
