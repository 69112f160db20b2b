//! Per-document-type counter driving allocation.

use serde::{Deserialize, Serialize};

use crate::document_type::DocumentType;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::format::{DEFAULT_PADDING, MAX_PADDING, ReferenceNumber};
use crate::prefix::effective_prefix;

/// Value a counter starts at, and the value used when a stored one is unreadable.
pub const INITIAL_NEXT_NUMBER: u64 = 1;

/// Parse a raw stored `next_number`.
///
/// Surrounding whitespace is tolerated; anything else that is not a base-10
/// non-negative integer is `InvalidStoredCounter`.
pub fn parse_stored_next(raw: &str) -> DomainResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| DomainError::invalid_stored_counter(format!("{raw:?}: {e}")))
}

/// Value to allocate for a possibly-missing, possibly-corrupted stored counter.
///
/// Missing counters start at 1; unparsable ones are recovered as 1.
pub fn current_value(raw: Option<&str>) -> u64 {
    match raw {
        None => INITIAL_NEXT_NUMBER,
        Some(raw) => match parse_stored_next(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stored counter unreadable; restarting at 1");
                INITIAL_NEXT_NUMBER
            }
        },
    }
}

pub fn validate_padding(padding: u32) -> DomainResult<u32> {
    if (1..=MAX_PADDING).contains(&padding) {
        Ok(padding)
    } else {
        Err(DomainError::validation(format!(
            "padding must be between 1 and {MAX_PADDING}, got {padding}"
        )))
    }
}

/// Counter for one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounter {
    document_type: DocumentType,
    prefix: Option<String>,
    padding: u32,
    next_number: u64,
}

impl DocumentCounter {
    /// A counter that has never been allocated against.
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            prefix: None,
            padding: DEFAULT_PADDING,
            next_number: INITIAL_NEXT_NUMBER,
        }
    }

    /// Rehydrate from stored parts. An unreadable `next_number` becomes 1.
    pub fn from_stored(
        document_type: DocumentType,
        prefix: Option<String>,
        padding: Option<u32>,
        next_number: Option<&str>,
    ) -> Self {
        Self {
            document_type,
            prefix,
            padding: padding.unwrap_or(DEFAULT_PADDING),
            next_number: current_value(next_number),
        }
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    /// Prefix configured on this counter, if any.
    pub fn configured_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    pub fn next_number(&self) -> u64 {
        self.next_number
    }

    /// Prefix the next number is rendered with, given an optional override.
    pub fn prefix_for<'a>(&'a self, override_prefix: Option<&'a str>) -> &'a str {
        effective_prefix(&self.document_type, override_prefix, self.prefix.as_deref())
    }

    /// Render the number the next allocation would return, without consuming it.
    pub fn peek(&self, override_prefix: Option<&str>) -> ReferenceNumber {
        ReferenceNumber::new(self.prefix_for(override_prefix), self.next_number, self.padding)
    }

    /// Take the current value and advance by one.
    ///
    /// Returns the allocated value. Fails only at `u64::MAX`, leaving the
    /// counter untouched.
    pub fn advance(&mut self) -> DomainResult<u64> {
        let current = self.next_number;
        self.next_number = current
            .checked_add(1)
            .ok_or_else(|| DomainError::validation(format!("counter for {} exhausted", self.document_type)))?;
        Ok(current)
    }

    /// Administrative reset. May lower the counter.
    pub fn reset(&mut self, next_number: u64) {
        self.next_number = next_number;
    }

    pub fn set_prefix(&mut self, prefix: Option<String>) {
        self.prefix = prefix;
    }

    pub fn set_padding(&mut self, padding: u32) -> DomainResult<()> {
        self.padding = validate_padding(padding)?;
        Ok(())
    }
}

impl Entity for DocumentCounter {
    type Id = DocumentType;

    fn id(&self) -> &Self::Id {
        &self.document_type
    }
}
