//! Infrastructure layer: counter storage and the sequence allocator.

pub mod allocator;
pub mod counter_store;

#[cfg(test)]
mod integration_tests;

pub use allocator::{AllocationError, SequenceAllocator};
pub use counter_store::{CounterRecord, CounterStore, InMemoryCounterStore, PostgresCounterStore, StoreError};
