//! Events emitted by the sequence allocator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docseq_core::{DocumentType, ReferenceNumber};

use crate::event::Event;

/// Event: NumberAllocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberAllocated {
    pub document_type: DocumentType,
    pub document_number: ReferenceNumber,
    /// Numeric part of `document_number`.
    pub value: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CounterReset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterReset {
    pub document_type: DocumentType,
    /// `None` when the counter had never been stored.
    pub previous_next_number: Option<u64>,
    pub next_number: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PrefixUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixUpdated {
    pub document_type: DocumentType,
    /// `None` restores the default prefix table.
    pub prefix: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaddingUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddingUpdated {
    pub document_type: DocumentType,
    pub padding: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumberingEvent {
    NumberAllocated(NumberAllocated),
    CounterReset(CounterReset),
    PrefixUpdated(PrefixUpdated),
    PaddingUpdated(PaddingUpdated),
}

impl NumberingEvent {
    pub fn document_type(&self) -> &DocumentType {
        match self {
            NumberingEvent::NumberAllocated(e) => &e.document_type,
            NumberingEvent::CounterReset(e) => &e.document_type,
            NumberingEvent::PrefixUpdated(e) => &e.document_type,
            NumberingEvent::PaddingUpdated(e) => &e.document_type,
        }
    }
}

impl Event for NumberingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            NumberingEvent::NumberAllocated(_) => "numbering.number.allocated",
            NumberingEvent::CounterReset(_) => "numbering.counter.reset",
            NumberingEvent::PrefixUpdated(_) => "numbering.prefix.updated",
            NumberingEvent::PaddingUpdated(_) => "numbering.padding.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NumberingEvent::NumberAllocated(e) => e.occurred_at,
            NumberingEvent::CounterReset(e) => e.occurred_at,
            NumberingEvent::PrefixUpdated(e) => e.occurred_at,
            NumberingEvent::PaddingUpdated(e) => e.occurred_at,
        }
    }
}
