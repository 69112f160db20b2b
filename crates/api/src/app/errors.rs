use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use docseq_infra::AllocationError;

pub fn allocation_error_to_response(err: AllocationError) -> axum::response::Response {
    match err {
        AllocationError::StorageUnavailable(msg) => {
            tracing::error!(error = %msg, "counter storage unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
        AllocationError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AllocationError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

/// A request body that does not deserialize is a 400 `validation_error`.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
