//! Infrastructure wiring: counter store, event bus, allocator, realtime feed.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast;

use docseq_events::{EventBus, EventEnvelope, InMemoryEventBus, NumberingEvent};
use docseq_infra::{CounterStore, InMemoryCounterStore, PostgresCounterStore, SequenceAllocator};

use crate::config::{AppConfig, StorageConfig};

pub type NumberingEnvelope = EventEnvelope<NumberingEvent>;

pub type Allocator = SequenceAllocator<Arc<dyn CounterStore>, Arc<InMemoryEventBus<NumberingEnvelope>>>;

/// Shared services handed to every handler through an `Extension`.
pub struct AppServices {
    pub allocator: Allocator,
    realtime_tx: broadcast::Sender<NumberingEnvelope>,
}

impl AppServices {
    /// Wire services around an already-built counter store.
    ///
    /// Must be called inside a Tokio runtime (spawns the realtime bridge).
    pub fn with_store(store: Arc<dyn CounterStore>) -> Self {
        let bus: Arc<InMemoryEventBus<NumberingEnvelope>> = Arc::new(InMemoryEventBus::new());

        // Realtime channel (SSE): lossy broadcast fed from the bus.
        let (realtime_tx, _realtime_rx) = broadcast::channel::<NumberingEnvelope>(256);

        // Background subscriber: bus -> realtime channel. Ends once the bus
        // (owned by the allocator) is dropped.
        {
            let sub = bus.subscribe();
            let realtime_tx = realtime_tx.clone();
            tokio::task::spawn_blocking(move || {
                while let Ok(env) = sub.recv() {
                    // No SSE clients connected is not an error.
                    let _ = realtime_tx.send(env);
                }
            });
        }

        Self {
            allocator: SequenceAllocator::new(store, bus),
            realtime_tx,
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryCounterStore::new()))
    }

    pub fn subscribe_realtime(&self) -> broadcast::Receiver<NumberingEnvelope> {
        self.realtime_tx.subscribe()
    }
}

/// Build services for the configured storage backend.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.storage {
        StorageConfig::InMemory => {
            tracing::warn!("using in-memory counter store; counters are lost on restart");
            Ok(AppServices::in_memory())
        }
        StorageConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;

            let store = PostgresCounterStore::new(pool);
            store
                .ensure_schema()
                .await
                .context("failed to create document_counters table")?;

            tracing::info!(max_connections, "using Postgres counter store");
            Ok(AppServices::with_store(Arc::new(store)))
        }
    }
}
