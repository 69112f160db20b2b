use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Server-sent events feed of committed numbering changes.
///
/// Each message is named after the event type and carries the full envelope
/// (`event_id`, `document_type`, `event_type`, `event_version`, `payload`).
/// Lossy: a client that falls behind the broadcast buffer skips events.
pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let events = BroadcastStream::new(services.subscribe_realtime()).filter_map(|msg| {
        let env = msg.ok()?;
        let event = SseEvent::default()
            .event(env.event_type().to_string())
            .id(env.event_id().to_string())
            .json_data(&env)
            .ok()?;
        Some(Ok(event))
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
