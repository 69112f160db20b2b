//! Document types that carry a reference number.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Kind of business document a reference number is issued for.
///
/// Parsing is case-sensitive and total: anything that is not one of the known
/// keys becomes `Other`, which still gets its own independent counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    Invoice,
    Estimate,
    Receipt,
    Proposal,
    Expense,
    Other(String),
}

impl DocumentType {
    /// Known document types, in the order they appear in settings listings.
    pub const KNOWN: [DocumentType; 5] = [
        DocumentType::Invoice,
        DocumentType::Estimate,
        DocumentType::Receipt,
        DocumentType::Proposal,
        DocumentType::Expense,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "invoice" => Self::Invoice,
            "estimate" => Self::Estimate,
            "receipt" => Self::Receipt,
            "proposal" => Self::Proposal,
            "expense" => Self::Expense,
            other => Self::Other(other.to_string()),
        }
    }

    /// Storage key of the counter for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Invoice => "invoice",
            Self::Estimate => "estimate",
            Self::Receipt => "receipt",
            Self::Proposal => "proposal",
            Self::Expense => "expense",
            Self::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl core::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for DocumentType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for DocumentType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DocumentType> for String {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}
