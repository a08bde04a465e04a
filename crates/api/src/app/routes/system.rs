use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto::HealthResponse;
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store_ready().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response(),
        Err(e) => errors::json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", e.to_string()),
    }
}
