//! Sequence allocation (application-level orchestration).
//!
//! ```text
//! allocate(document_type, prefix?)
//!   ↓
//! 1. CounterStore::modify (atomic per document type)
//!      read stored next_number (missing or unreadable → 1)
//!      write next_number + 1
//!   ↓
//! 2. Render prefix + zero-padded value
//!   ↓
//! 3. Publish NumberAllocated (after commit, best-effort)
//! ```
//!
//! Nothing is rendered or returned unless step 1 committed, so a storage
//! failure never hands out a number that could be issued again.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use docseq_core::{
    DocumentCounter, DocumentType, DomainError, ReferenceNumber, parse_stored_next,
    validate_padding,
};
use docseq_events::{
    CounterReset, EventBus, EventEnvelope, NumberAllocated, NumberingEvent, PaddingUpdated,
    PrefixUpdated,
};

use crate::counter_store::{CounterRecord, CounterStore, Modified, StoreError};

#[derive(Debug, Error)]
pub enum AllocationError {
    /// The counter store could not be read or written. Nothing was committed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Rejected input (padding out of range, exhausted counter).
    #[error("validation failed: {0}")]
    Validation(String),
    /// The counter has never been stored.
    #[error("not found")]
    NotFound,
}

impl From<DomainError> for AllocationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => AllocationError::Validation(msg),
            DomainError::InvalidStoredCounter(msg) => AllocationError::Validation(msg),
            DomainError::NotFound => AllocationError::NotFound,
        }
    }
}

impl From<StoreError> for AllocationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => AllocationError::StorageUnavailable(msg),
            StoreError::Rejected(e) => e.into(),
        }
    }
}

/// Hands out reference numbers and administers counters.
///
/// ## Generic Parameters
///
/// - `S`: counter store (must implement `CounterStore`)
/// - `B`: event bus the committed changes are announced on
pub struct SequenceAllocator<S, B> {
    store: S,
    bus: B,
}

impl<S, B> SequenceAllocator<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<S, B> SequenceAllocator<S, B>
where
    S: CounterStore,
    B: EventBus<EventEnvelope<NumberingEvent>>,
{
    /// Allocate the next reference number for `document_type`.
    ///
    /// `prefix_override` takes precedence over both the configured and the
    /// default prefix; it is not stored.
    #[instrument(skip(self, document_type), fields(document_type = %document_type), err)]
    pub async fn allocate(
        &self,
        document_type: &DocumentType,
        prefix_override: Option<&str>,
    ) -> Result<ReferenceNumber, AllocationError> {
        let advance = |stored: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            let mut counter = CounterRecord::counter_for(document_type, stored);
            counter.advance()?;
            Ok(CounterRecord::from_counter(&counter))
        };

        let Modified { current, .. } = self.store.modify(document_type.as_str(), &advance).await?;

        let counter = current.to_counter();
        // Written by `advance` above, so next_number >= 1.
        let value = counter.next_number() - 1;
        let number = ReferenceNumber::new(counter.prefix_for(prefix_override), value, counter.padding());

        tracing::debug!(document_number = %number, value, "allocated document number");

        self.publish(NumberingEvent::NumberAllocated(NumberAllocated {
            document_type: document_type.clone(),
            document_number: number.clone(),
            value,
            occurred_at: Utc::now(),
        }));

        Ok(number)
    }

    /// Render what the next `allocate` would return, without consuming it.
    ///
    /// Racing allocations may take the number before the caller does.
    #[instrument(skip(self, document_type), fields(document_type = %document_type), err)]
    pub async fn peek(
        &self,
        document_type: &DocumentType,
        prefix_override: Option<&str>,
    ) -> Result<ReferenceNumber, AllocationError> {
        let stored = self.store.load(document_type.as_str()).await?;
        let counter = CounterRecord::counter_for(document_type, stored.as_ref());
        Ok(counter.peek(prefix_override))
    }

    /// Administrative reset: the next allocation yields `next_number`.
    ///
    /// The only operation allowed to lower a counter. The previous value is
    /// carried on the published `CounterReset` event for auditing.
    #[instrument(skip(self, document_type), fields(document_type = %document_type), err)]
    pub async fn reset(
        &self,
        document_type: &DocumentType,
        next_number: u64,
    ) -> Result<DocumentCounter, AllocationError> {
        let reset = |stored: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            let mut counter = CounterRecord::counter_for(document_type, stored);
            counter.reset(next_number);
            Ok(CounterRecord::from_counter(&counter))
        };

        let modified = self.store.modify(document_type.as_str(), &reset).await?;
        let previous_next_number = modified
            .previous
            .as_ref()
            .and_then(|r| parse_stored_next(&r.next_number).ok());

        tracing::info!(
            previous = ?previous_next_number,
            next_number,
            "document counter reset"
        );

        self.publish(NumberingEvent::CounterReset(CounterReset {
            document_type: document_type.clone(),
            previous_next_number,
            next_number,
            occurred_at: Utc::now(),
        }));

        Ok(modified.current.to_counter())
    }

    /// Configure (or with `None`, clear) the prefix stored on the counter.
    #[instrument(skip(self, document_type), fields(document_type = %document_type), err)]
    pub async fn set_prefix(
        &self,
        document_type: &DocumentType,
        prefix: Option<String>,
    ) -> Result<DocumentCounter, AllocationError> {
        let set = |stored: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            let mut counter = CounterRecord::counter_for(document_type, stored);
            counter.set_prefix(prefix.clone());
            Ok(CounterRecord::from_counter(&counter))
        };

        let modified = self.store.modify(document_type.as_str(), &set).await?;

        self.publish(NumberingEvent::PrefixUpdated(PrefixUpdated {
            document_type: document_type.clone(),
            prefix,
            occurred_at: Utc::now(),
        }));

        Ok(modified.current.to_counter())
    }

    /// Configure the minimum digit width of the counter's numbers.
    #[instrument(skip(self, document_type), fields(document_type = %document_type), err)]
    pub async fn set_padding(
        &self,
        document_type: &DocumentType,
        padding: u32,
    ) -> Result<DocumentCounter, AllocationError> {
        // Validate up front so a bad request never takes the counter lock.
        validate_padding(padding)?;

        let set = |stored: Option<&CounterRecord>| -> Result<CounterRecord, DomainError> {
            let mut counter = CounterRecord::counter_for(document_type, stored);
            counter.set_padding(padding)?;
            Ok(CounterRecord::from_counter(&counter))
        };

        let modified = self.store.modify(document_type.as_str(), &set).await?;

        self.publish(NumberingEvent::PaddingUpdated(PaddingUpdated {
            document_type: document_type.clone(),
            padding,
            occurred_at: Utc::now(),
        }));

        Ok(modified.current.to_counter())
    }

    /// Current settings of one counter.
    pub async fn counter(&self, document_type: &DocumentType) -> Result<DocumentCounter, AllocationError> {
        self.store
            .load(document_type.as_str())
            .await?
            .map(|r| r.to_counter())
            .ok_or(AllocationError::NotFound)
    }

    /// Current settings of every stored counter, ordered by document type key.
    pub async fn counters(&self) -> Result<Vec<DocumentCounter>, AllocationError> {
        Ok(self
            .store
            .list()
            .await?
            .iter()
            .map(CounterRecord::to_counter)
            .collect())
    }

    fn publish(&self, event: NumberingEvent) {
        let envelope = EventEnvelope::wrap(event.document_type().clone(), event);
        // The counter change is already committed; failing the call here would
        // only burn the number.
        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(error = ?err, "failed to publish numbering event");
        }
    }
}
