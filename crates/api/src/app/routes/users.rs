use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::dto::{self, CreateUserRequest, DeleteUserResponse, UpdateUserRequest};
use crate::app::errors;
use crate::app::services::{resolve_id, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.list_users().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let fields = match dto::parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.create_user(fields).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match resolve_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.get_user(&id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    // Id first: a malformed id is 404 even when the body is also bad.
    let id = match resolve_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };
    let patch = match dto::parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.update_user(&id, patch).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match resolve_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.delete_user(&id).await {
        Ok(()) => (StatusCode::OK, Json(DeleteUserResponse { id, deleted: true })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
