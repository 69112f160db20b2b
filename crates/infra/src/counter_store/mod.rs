//! Counter storage boundary.
//!
//! The allocator only needs atomic read-modify-write by document type; this
//! module defines that contract and its in-memory and Postgres backends.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCounterStore;
pub use postgres::PostgresCounterStore;
pub use r#trait::{CounterMutation, CounterRecord, CounterStore, Modified, StoreError};
