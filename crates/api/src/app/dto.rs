use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use userbase_core::UserId;

use crate::app::errors;

/// Request body for `POST /users`.
pub type CreateUserRequest = userbase_core::UserFields;

/// Request body for `PUT /users/:id`.
pub type UpdateUserRequest = userbase_core::UserPatch;

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub id: UserId,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Unwrap a JSON body, turning any rejection (bad syntax, wrong content
/// type, wrong value types) into the standard 400 error body.
pub fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            rejection.body_text(),
        )),
    }
}
