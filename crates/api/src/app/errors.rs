use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        ServiceError::Unavailable(msg) => {
            tracing::error!(error = %msg, "user store unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
        }
        ServiceError::Store(msg) => {
            tracing::error!(error = %msg, "user store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
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
