//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the store-facing facade handlers call into
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request body extraction and response shapes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use userbase_infra::UserStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around an already-connected store.
pub fn build_app(store: Arc<dyn UserStore>) -> Router {
    let services = Arc::new(services::AppServices::new(store));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(services)),
        )
}
