//! Reference number rendering.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Minimum digit width of the numeric part unless a counter configures another.
pub const DEFAULT_PADDING: u32 = 6;

/// Widest padding a counter may be configured with.
pub const MAX_PADDING: u32 = 20;

/// Render `prefix` followed by `value` zero-padded to six digits.
///
/// The prefix is not sanitized. Values with six or more digits are printed in
/// full.
pub fn format_reference(prefix: &str, value: u64) -> String {
    format_reference_with_padding(prefix, value, DEFAULT_PADDING)
}

/// Same as [`format_reference`] with an explicit minimum width.
pub fn format_reference_with_padding(prefix: &str, value: u64, padding: u32) -> String {
    format!("{prefix}{value:0>width$}", width = padding as usize)
}

/// A rendered, human-facing document number (e.g. `INV-000001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    pub fn new(prefix: &str, value: u64, padding: u32) -> Self {
        Self(format_reference_with_padding(prefix, value, padding))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl ValueObject for ReferenceNumber {}

impl core::fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ReferenceNumber> for String {
    fn from(value: ReferenceNumber) -> Self {
        value.0
    }
}
