//! HTTP transport: routers, handlers, middleware.

pub mod api;
pub mod middleware;

pub use api::ApiState;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::application::error::ErrorReport;
use crate::infra::db::PostgresRepositories;

/// Assemble the full service router: the public health probe plus the
/// credential-gated catalog API, wrapped in request-context and response
/// logging middleware.
pub fn build_router(api_state: ApiState, db: Arc<PostgresRepositories>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(db)
        .merge(api::build_api_router(api_state))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Liveness plus database reachability. Deliberately outside the credential
/// gate so probes work without the shared secret.
async fn health(State(db): State<Arc<PostgresRepositories>>) -> Response {
    match db.health_check().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(err) => {
            let mut response = (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response();
            ErrorReport::from_error("infra::http::health", StatusCode::SERVICE_UNAVAILABLE, &err)
                .attach(&mut response);
            response
        }
    }
}
