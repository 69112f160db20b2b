use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::de::DeserializeOwned;

use docseq_core::DocumentType;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_counters))
        .route("/:document_type", get(get_counter))
        .route("/:document_type/next", post(allocate_number))
        .route("/:document_type/preview", get(preview_number))
        .route("/:document_type/reset", post(reset_counter))
        .route("/:document_type/prefix", put(update_prefix))
        .route("/:document_type/padding", put(update_padding))
}

/// Body that may be omitted entirely. Empty means `T::default()`; anything
/// else must be valid JSON for `T`.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, JsonRejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Json::<T>::from_bytes(body).map(|Json(b)| b)
}

pub async fn allocate_number(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);
    let body: dto::AllocateRequest = match optional_body(&body) {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services
        .allocator
        .allocate(&document_type, body.prefix.as_deref())
        .await
    {
        Ok(number) => {
            tracing::info!(%document_type, document_number = %number, "document number generated");
            (
                StatusCode::CREATED,
                Json(dto::DocumentNumberResponse {
                    document_number: number,
                }),
            )
                .into_response()
        }
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn preview_number(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
    Query(query): Query<dto::PreviewQuery>,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);

    match services
        .allocator
        .peek(&document_type, query.prefix.as_deref())
        .await
    {
        Ok(number) => Json(dto::DocumentNumberResponse {
            document_number: number,
        })
        .into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn list_counters(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.allocator.counters().await {
        Ok(counters) => {
            let out: Vec<dto::CounterResponse> = counters.iter().map(dto::CounterResponse::from).collect();
            Json(out).into_response()
        }
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn get_counter(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);

    match services.allocator.counter(&document_type).await {
        Ok(counter) => Json(dto::CounterResponse::from(&counter)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn reset_counter(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);
    let body: dto::ResetCounterRequest = match optional_body(&body) {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let next_number = body.next_number.unwrap_or(docseq_core::INITIAL_NEXT_NUMBER);

    match services.allocator.reset(&document_type, next_number).await {
        Ok(counter) => Json(dto::CounterResponse::from(&counter)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn update_prefix(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
    body: Result<Json<dto::UpdatePrefixRequest>, JsonRejection>,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.allocator.set_prefix(&document_type, body.prefix).await {
        Ok(counter) => Json(dto::CounterResponse::from(&counter)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}

pub async fn update_padding(
    Extension(services): Extension<Arc<AppServices>>,
    Path(document_type): Path<String>,
    body: Result<Json<dto::UpdatePaddingRequest>, JsonRejection>,
) -> axum::response::Response {
    let document_type = DocumentType::parse(&document_type);
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.allocator.set_padding(&document_type, body.padding).await {
        Ok(counter) => Json(dto::CounterResponse::from(&counter)).into_response(),
        Err(e) => errors::allocation_error_to_response(e),
    }
}
