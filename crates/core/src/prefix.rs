//! Default prefix table.

use crate::document_type::DocumentType;

/// Prefix used for any document type without a table entry.
pub const FALLBACK_PREFIX: &str = "DOC-";

/// Map a document type to its default display prefix.
///
/// Pure lookup; an unknown type is not an error, it takes the fallback.
pub fn resolve_prefix(document_type: &DocumentType) -> &'static str {
    match document_type {
        DocumentType::Invoice => "INV-",
        DocumentType::Estimate => "EST-",
        DocumentType::Receipt => "REC-",
        DocumentType::Proposal => "PROP-",
        DocumentType::Expense => "EXP-",
        DocumentType::Other(_) => FALLBACK_PREFIX,
    }
}

/// Pick the prefix a reference number is rendered with.
///
/// Precedence: explicit per-call override, then the prefix configured on the
/// counter, then the default table.
pub fn effective_prefix<'a>(
    document_type: &DocumentType,
    override_prefix: Option<&'a str>,
    configured: Option<&'a str>,
) -> &'a str {
    override_prefix
        .or(configured)
        .unwrap_or_else(|| resolve_prefix(document_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_use_fixed_table() {
        assert_eq!(resolve_prefix(&DocumentType::Invoice), "INV-");
        assert_eq!(resolve_prefix(&DocumentType::Estimate), "EST-");
        assert_eq!(resolve_prefix(&DocumentType::Receipt), "REC-");
        assert_eq!(resolve_prefix(&DocumentType::Proposal), "PROP-");
        assert_eq!(resolve_prefix(&DocumentType::Expense), "EXP-");
    }

    #[test]
    fn unknown_types_fall_back_to_doc() {
        for raw in ["unknown", "", "INVOICE", "invoice ", "payroll"] {
            assert_eq!(resolve_prefix(&DocumentType::parse(raw)), "DOC-", "type {raw:?}");
        }
    }

    #[test]
    fn override_beats_configured_beats_table() {
        let ty = DocumentType::Estimate;
        assert_eq!(effective_prefix(&ty, Some("Q-"), Some("QUOTE-")), "Q-");
        assert_eq!(effective_prefix(&ty, None, Some("QUOTE-")), "QUOTE-");
        assert_eq!(effective_prefix(&ty, None, None), "EST-");
    }

    #[test]
    fn empty_override_is_still_an_override() {
        assert_eq!(effective_prefix(&DocumentType::Invoice, Some(""), None), "");
    }
}
