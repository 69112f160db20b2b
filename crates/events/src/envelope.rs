use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docseq_core::DocumentType;

use crate::event::Event;

/// Envelope for a published event.
///
/// Notes:
/// - `event_id` is a UUIDv7, so ids sort by publication time.
/// - `document_type` is the counter the event belongs to, duplicated out of the
///   payload so subscribers can filter without matching on it.
/// - `event_version` is the payload's schema version at publication time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    document_type: DocumentType,
    event_type: String,
    event_version: u32,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        document_type: DocumentType,
        event_type: impl Into<String>,
        event_version: u32,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            document_type,
            event_type: event_type.into(),
            event_version,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap an event with a fresh id.
    pub fn wrap(document_type: DocumentType, payload: E) -> Self {
        let event_type = payload.event_type();
        let event_version = payload.version();
        Self::new(Uuid::now_v7(), document_type, event_type, event_version, payload)
    }
}
