//! Numbering events and the bus they are published on.
//!
//! Every committed counter mutation is announced here so callers can keep an
//! audit trail (resets in particular are the only sanctioned way to lower a
//! counter).

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;
pub mod numbering;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use numbering::{CounterReset, NumberAllocated, NumberingEvent, PaddingUpdated, PrefixUpdated};
