use axum::{
    http::{header, Method, Uri},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;

use crate::api::handlers::{health_handler, readiness_handler};
use crate::api::middleware::error_handling::{create_error_handling_middleware, ErrorDispatcher};
use crate::api::openapi::swagger_ui;
use crate::domain::HttpException;

/// Application state container
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Create router with all routes and middleware
pub fn create_router(state: AppState, dispatcher: Arc<ErrorDispatcher>) -> Router {
    Router::new()
        // Health checks (no auth required)
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .fallback(route_not_found)
        .with_state(state)
        .merge(swagger_ui())
        // Every route above answers errors through the error handling layer
        .layer(create_error_handling_middleware(dispatcher))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
}

async fn route_not_found(method: Method, uri: Uri) -> HttpException {
    HttpException::not_found(format!("Cannot {} {}", method, uri.path()))
}
