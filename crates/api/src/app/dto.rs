use serde::{Deserialize, Serialize};

use docseq_core::{DocumentCounter, ReferenceNumber};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllocateRequest {
    /// One-off prefix for this number only; not stored.
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetCounterRequest {
    /// Defaults to 1.
    pub next_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePrefixRequest {
    /// `null` restores the default prefix.
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePaddingRequest {
    pub padding: u32,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct DocumentNumberResponse {
    pub document_number: ReferenceNumber,
}

#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub document_type: String,
    /// Prefix the next number is rendered with.
    pub prefix: String,
    pub configured_prefix: Option<String>,
    pub padding: u32,
    pub next_number: u64,
    pub preview: ReferenceNumber,
}

impl From<&DocumentCounter> for CounterResponse {
    fn from(counter: &DocumentCounter) -> Self {
        Self {
            document_type: counter.document_type().to_string(),
            prefix: counter.prefix_for(None).to_string(),
            configured_prefix: counter.configured_prefix().map(str::to_string),
            padding: counter.padding(),
            next_number: counter.next_number(),
            preview: counter.peek(None),
        }
    }
}
