use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use docseq_core::{DocumentCounter, DocumentType, DomainError};

/// A counter as the storage layer sees it.
///
/// `next_number` is kept as raw text: a corrupted value must survive the trip
/// out of storage so the allocator can recover from it instead of the row
/// failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub document_type: String,
    pub prefix: Option<String>,
    pub padding: Option<u32>,
    pub next_number: String,
    pub updated_at: DateTime<Utc>,
}

impl CounterRecord {
    pub fn from_counter(counter: &DocumentCounter) -> Self {
        Self {
            document_type: counter.document_type().as_str().to_string(),
            prefix: counter.configured_prefix().map(str::to_string),
            padding: Some(counter.padding()),
            next_number: counter.next_number().to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn to_counter(&self) -> DocumentCounter {
        DocumentCounter::from_stored(
            DocumentType::parse(&self.document_type),
            self.prefix.clone(),
            self.padding,
            Some(&self.next_number),
        )
    }

    /// Counter for `document_type`, starting fresh when nothing is stored.
    pub fn counter_for(document_type: &DocumentType, stored: Option<&CounterRecord>) -> DocumentCounter {
        match stored {
            Some(record) => record.to_counter(),
            None => DocumentCounter::new(document_type.clone()),
        }
    }
}

/// Counter store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not complete a read or write (IO, pool, poisoned lock).
    #[error("counter storage unavailable: {0}")]
    Unavailable(String),

    /// The mutation refused the change; nothing was written.
    #[error("counter update rejected: {0}")]
    Rejected(#[from] DomainError),
}

/// Pure read-modify-write step applied by [`CounterStore::modify`].
///
/// Receives the currently stored record (if any) and returns the record to
/// persist. Must not block: stores call it while holding the per-key lock.
pub type CounterMutation<'a> =
    &'a (dyn Fn(Option<&CounterRecord>) -> Result<CounterRecord, DomainError> + Send + Sync);

/// Outcome of a committed [`CounterStore::modify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modified {
    pub previous: Option<CounterRecord>,
    pub current: CounterRecord,
}

/// Keyed storage for document counters.
///
/// Implementations must:
/// - run `modify` as one atomic step per key: no two concurrent calls for the
///   same document type may both observe the same stored record
/// - write nothing when the mutation fails or the write does not commit
/// - keep counters for distinct document types independent
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Load the stored record for a document type.
    async fn load(&self, document_type: &str) -> Result<Option<CounterRecord>, StoreError>;

    /// All stored records, ordered by document type.
    async fn list(&self) -> Result<Vec<CounterRecord>, StoreError>;

    /// Atomically read, transform and write the record for a document type.
    async fn modify(
        &self,
        document_type: &str,
        mutation: CounterMutation<'_>,
    ) -> Result<Modified, StoreError>;
}

#[async_trait]
impl<S> CounterStore for Arc<S>
where
    S: CounterStore + ?Sized,
{
    async fn load(&self, document_type: &str) -> Result<Option<CounterRecord>, StoreError> {
        (**self).load(document_type).await
    }

    async fn list(&self) -> Result<Vec<CounterRecord>, StoreError> {
        (**self).list().await
    }

    async fn modify(
        &self,
        document_type: &str,
        mutation: CounterMutation<'_>,
    ) -> Result<Modified, StoreError> {
        (**self).modify(document_type, mutation).await
    }
}
