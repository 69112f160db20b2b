use axum::{routing::get, Router};

pub mod numbering;
pub mod system;

/// Router for the numbering endpoints and the event feed.
pub fn router() -> Router {
    Router::new()
        .route("/stream", get(system::stream))
        .nest("/numbering", numbering::router())
}
