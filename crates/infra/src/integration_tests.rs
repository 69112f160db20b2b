//! Integration tests for the allocation pipeline.
//!
//! Tests: allocate → CounterStore (atomic modify) → EventBus
//!
//! Verifies:
//! - Sequential numbers per document type, independent across types
//! - Resets, corrupted stored values, prefix precedence
//! - Concurrent allocations never duplicate or skip a number
//! - Storage failures surface and hand out nothing

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use docseq_core::DocumentType;
use docseq_events::{EventBus, EventEnvelope, InMemoryEventBus, NumberingEvent};

use crate::allocator::{AllocationError, SequenceAllocator};
use crate::counter_store::{
    CounterMutation, CounterRecord, CounterStore, InMemoryCounterStore, Modified, StoreError,
};

type TestBus = Arc<InMemoryEventBus<EventEnvelope<NumberingEvent>>>;

fn setup() -> (SequenceAllocator<Arc<InMemoryCounterStore>, TestBus>, Arc<InMemoryCounterStore>, TestBus) {
    let store = Arc::new(InMemoryCounterStore::new());
    let bus: TestBus = Arc::new(InMemoryEventBus::new());
    let allocator = SequenceAllocator::new(store.clone(), bus.clone());
    (allocator, store, bus)
}

fn raw_record(document_type: &str, next_number: &str) -> CounterRecord {
    CounterRecord {
        document_type: document_type.to_string(),
        prefix: None,
        padding: None,
        next_number: next_number.to_string(),
        updated_at: Utc::now(),
    }
}

/// Store whose backend is down.
struct UnavailableStore;

#[async_trait]
impl CounterStore for UnavailableStore {
    async fn load(&self, _document_type: &str) -> Result<Option<CounterRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<CounterRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn modify(
        &self,
        _document_type: &str,
        _mutation: CounterMutation<'_>,
    ) -> Result<Modified, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn sequential_invoice_numbers() {
    let (allocator, _, _) = setup();

    let mut issued = Vec::new();
    for _ in 0..3 {
        issued.push(allocator.allocate(&DocumentType::Invoice, None).await.unwrap().into_string());
    }

    assert_eq!(issued, vec!["INV-000001", "INV-000002", "INV-000003"]);
}

#[tokio::test]
async fn counters_are_independent_per_type() {
    let (allocator, _, _) = setup();

    let inv1 = allocator.allocate(&DocumentType::Invoice, None).await.unwrap();
    let est1 = allocator.allocate(&DocumentType::Estimate, None).await.unwrap();
    let inv2 = allocator.allocate(&DocumentType::Invoice, None).await.unwrap();
    let est2 = allocator.allocate(&DocumentType::Estimate, None).await.unwrap();

    assert_eq!((inv1.as_str(), inv2.as_str()), ("INV-000001", "INV-000002"));
    assert_eq!((est1.as_str(), est2.as_str()), ("EST-000001", "EST-000002"));
}

#[tokio::test]
async fn unknown_type_gets_doc_prefix_and_own_counter() {
    let (allocator, _, _) = setup();

    let payroll = DocumentType::parse("payroll");
    assert_eq!(allocator.allocate(&payroll, None).await.unwrap().as_str(), "DOC-000001");
    assert_eq!(allocator.allocate(&payroll, None).await.unwrap().as_str(), "DOC-000002");

    let other = DocumentType::parse("timesheet");
    assert_eq!(allocator.allocate(&other, None).await.unwrap().as_str(), "DOC-000001");
}

#[tokio::test]
async fn reset_lowers_counter() {
    let (allocator, _, bus) = setup();
    let sub = bus.subscribe();

    allocator.reset(&DocumentType::Invoice, 101).await.unwrap();
    assert_eq!(
        allocator.allocate(&DocumentType::Invoice, None).await.unwrap().as_str(),
        "INV-000101"
    );

    let counter = allocator.reset(&DocumentType::Invoice, 1).await.unwrap();
    assert_eq!(counter.next_number(), 1);
    assert_eq!(
        allocator.allocate(&DocumentType::Invoice, None).await.unwrap().as_str(),
        "INV-000001"
    );

    let resets: Vec<_> = std::iter::from_fn(|| sub.try_recv().ok())
        .filter_map(|env| match env.into_payload() {
            NumberingEvent::CounterReset(e) => Some((e.previous_next_number, e.next_number)),
            _ => None,
        })
        .collect();
    assert_eq!(resets, vec![(None, 101), (Some(102), 1)]);
}

#[tokio::test]
async fn non_numeric_stored_value_restarts_at_one() {
    let (allocator, store, _) = setup();
    store.seed(raw_record("proposal", "invalid")).unwrap();

    let number = allocator.allocate(&DocumentType::Proposal, None).await.unwrap();
    assert_eq!(number.as_str(), "PROP-000001");

    let stored = store.load("proposal").await.unwrap().unwrap();
    assert_eq!(stored.next_number, "2");
}

#[tokio::test]
async fn large_stored_value_is_not_truncated() {
    let (allocator, store, _) = setup();
    store.seed(raw_record("receipt", "999999")).unwrap();

    assert_eq!(allocator.allocate(&DocumentType::Receipt, None).await.unwrap().as_str(), "REC-999999");
    assert_eq!(allocator.allocate(&DocumentType::Receipt, None).await.unwrap().as_str(), "REC-1000000");
}

#[tokio::test]
async fn prefix_precedence_override_then_configured_then_default() {
    let (allocator, _, _) = setup();

    allocator
        .set_prefix(&DocumentType::Estimate, Some("QUOTE-".to_string()))
        .await
        .unwrap();

    assert_eq!(allocator.allocate(&DocumentType::Estimate, None).await.unwrap().as_str(), "QUOTE-000001");
    assert_eq!(
        allocator.allocate(&DocumentType::Estimate, Some("Q-")).await.unwrap().as_str(),
        "Q-000002"
    );

    allocator.set_prefix(&DocumentType::Estimate, None).await.unwrap();
    assert_eq!(allocator.allocate(&DocumentType::Estimate, None).await.unwrap().as_str(), "EST-000003");
}

#[tokio::test]
async fn configured_padding_changes_width() {
    let (allocator, _, _) = setup();

    allocator.set_prefix(&DocumentType::Invoice, Some("INV-2025-".to_string())).await.unwrap();
    allocator.set_padding(&DocumentType::Invoice, 5).await.unwrap();

    assert_eq!(allocator.allocate(&DocumentType::Invoice, None).await.unwrap().as_str(), "INV-2025-00001");

    let err = allocator.set_padding(&DocumentType::Invoice, 0).await.unwrap_err();
    assert!(matches!(err, AllocationError::Validation(_)));
}

#[tokio::test]
async fn preview_does_not_consume() {
    let (allocator, _, _) = setup();

    assert_eq!(allocator.peek(&DocumentType::Expense, None).await.unwrap().as_str(), "EXP-000001");
    assert_eq!(allocator.peek(&DocumentType::Expense, None).await.unwrap().as_str(), "EXP-000001");
    assert_eq!(allocator.allocate(&DocumentType::Expense, None).await.unwrap().as_str(), "EXP-000001");
    assert_eq!(allocator.peek(&DocumentType::Expense, None).await.unwrap().as_str(), "EXP-000002");

    // Never stored by a preview.
    assert!(matches!(
        allocator.counter(&DocumentType::Receipt).await,
        Err(AllocationError::NotFound)
    ));
}

#[tokio::test]
async fn settings_list_every_touched_counter() {
    let (allocator, _, _) = setup();

    allocator.allocate(&DocumentType::Receipt, None).await.unwrap();
    allocator.allocate(&DocumentType::Invoice, None).await.unwrap();
    allocator.allocate(&DocumentType::Invoice, None).await.unwrap();

    let counters = allocator.counters().await.unwrap();
    let summary: Vec<(String, u64)> = counters
        .iter()
        .map(|c| (c.document_type().to_string(), c.next_number()))
        .collect();

    assert_eq!(summary, vec![("invoice".to_string(), 3), ("receipt".to_string(), 2)]);
}

#[tokio::test]
async fn storage_failure_hands_out_nothing() {
    let bus: TestBus = Arc::new(InMemoryEventBus::new());
    let sub = bus.subscribe();
    let allocator = SequenceAllocator::new(UnavailableStore, bus);

    let err = allocator.allocate(&DocumentType::Invoice, None).await.unwrap_err();
    assert!(matches!(err, AllocationError::StorageUnavailable(_)));

    let err = allocator.reset(&DocumentType::Invoice, 1).await.unwrap_err();
    assert!(matches!(err, AllocationError::StorageUnavailable(_)));

    assert!(sub.try_recv().is_err(), "nothing committed, nothing published");
}

#[tokio::test]
async fn allocation_is_published_after_commit() {
    let (allocator, _, bus) = setup();
    let sub = bus.subscribe();

    let number = allocator.allocate(&DocumentType::Invoice, None).await.unwrap();

    let env = sub.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(env.event_type(), "numbering.number.allocated");
    assert_eq!(env.event_version(), 1);
    assert_eq!(env.document_type(), &DocumentType::Invoice);
    match env.into_payload() {
        NumberingEvent::NumberAllocated(e) => {
            assert_eq!(e.document_number, number);
            assert_eq!(e.value, 1);
        }
        other => panic!("expected NumberAllocated, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_allocations_are_distinct_and_contiguous() {
    const N: u64 = 200;
    let (allocator, _, _) = setup();
    let allocator = Arc::new(allocator);

    let mut handles = Vec::new();
    for _ in 0..N {
        let allocator = allocator.clone();
        handles.push(tokio::spawn(async move {
            allocator.allocate(&DocumentType::Invoice, None).await.unwrap()
        }));
    }

    let mut issued = HashSet::new();
    for h in handles {
        assert!(issued.insert(h.await.unwrap().into_string()), "duplicate number issued");
    }

    let expected: HashSet<String> = (1..=N).map(|n| format!("INV-{n:06}")).collect();
    assert_eq!(issued, expected);
}
