use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::r#trait::{CounterMutation, CounterRecord, CounterStore, Modified, StoreError};

/// In-memory counter store.
///
/// Intended for tests/dev. A single write lock serializes every `modify`,
/// which is stricter than the per-key atomicity the trait asks for.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counters: RwLock<BTreeMap<String, CounterRecord>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a record verbatim, bypassing the domain layer.
    ///
    /// Lets tests and fixtures plant values the allocator would never write,
    /// such as a non-numeric `next_number`.
    pub fn seed(&self, record: CounterRecord) -> Result<(), StoreError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        counters.insert(record.document_type.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn load(&self, document_type: &str) -> Result<Option<CounterRecord>, StoreError> {
        let counters = self
            .counters
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(counters.get(document_type).cloned())
    }

    async fn list(&self) -> Result<Vec<CounterRecord>, StoreError> {
        let counters = self
            .counters
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(counters.values().cloned().collect())
    }

    async fn modify(
        &self,
        document_type: &str,
        mutation: CounterMutation<'_>,
    ) -> Result<Modified, StoreError> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let previous = counters.get(document_type).cloned();
        let current = mutation(previous.as_ref())?;
        counters.insert(document_type.to_string(), current.clone());

        Ok(Modified { previous, current })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docseq_core::DomainError;

    use super::*;

    fn record(document_type: &str, next_number: &str) -> CounterRecord {
        CounterRecord {
            document_type: document_type.to_string(),
            prefix: None,
            padding: None,
            next_number: next_number.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn modify_sees_previous_and_persists_current() {
        let store = InMemoryCounterStore::new();
        store.seed(record("invoice", "5")).unwrap();

        let bump = |prev: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            let n: u64 = prev.map(|r| r.next_number.parse().unwrap()).unwrap_or(1);
            Ok(record("invoice", &(n + 1).to_string()))
        };
        let modified = store.modify("invoice", &bump).await.unwrap();

        assert_eq!(modified.previous.unwrap().next_number, "5");
        assert_eq!(modified.current.next_number, "6");
        assert_eq!(store.load("invoice").await.unwrap().unwrap().next_number, "6");
    }

    #[tokio::test]
    async fn rejected_mutation_writes_nothing() {
        let store = InMemoryCounterStore::new();
        store.seed(record("invoice", "5")).unwrap();

        let refuse = |_: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            Err(DomainError::validation("no"))
        };
        let err = store.modify("invoice", &refuse).await.unwrap_err();

        assert!(matches!(err, StoreError::Rejected(DomainError::Validation(_))));
        assert_eq!(store.load("invoice").await.unwrap().unwrap().next_number, "5");
    }

    #[tokio::test]
    async fn list_is_ordered_by_document_type() {
        let store = InMemoryCounterStore::new();
        store.seed(record("receipt", "1")).unwrap();
        store.seed(record("estimate", "1")).unwrap();
        store.seed(record("invoice", "1")).unwrap();

        let keys: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.document_type)
            .collect();
        assert_eq!(keys, vec!["estimate", "invoice", "receipt"]);
    }
}
