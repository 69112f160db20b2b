//! `docseq-core` — document numbering domain.
//!
//! Pure functions and types only (no storage, no IO): the default prefix
//! table, the reference number formatter and the per-type counter.

pub mod counter;
pub mod document_type;
pub mod entity;
pub mod error;
pub mod format;
pub mod prefix;
pub mod value_object;

pub use counter::{DocumentCounter, INITIAL_NEXT_NUMBER, current_value, parse_stored_next, validate_padding};
pub use document_type::DocumentType;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use format::{DEFAULT_PADDING, MAX_PADDING, ReferenceNumber, format_reference, format_reference_with_padding};
pub use prefix::{FALLBACK_PREFIX, effective_prefix, resolve_prefix};
pub use value_object::ValueObject;
