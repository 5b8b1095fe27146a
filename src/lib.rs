//! # error_shield - HTTP error boundary for the tax platform API
//!
//! Every error raised while serving a request is caught here, classified,
//! logged in full for operators, and answered with a minimal client-safe
//! JSON body that never carries stack traces, SQL or driver internals.
//!
//! ## Architecture Layers
//!
//! - **Domain**: the normalized caught error and classification types
//! - **Application**: ordered classification and the log sink port
//! - **Infrastructure**: tracing setup, log sink, code table loading
//! - **API**: dispatcher, response composer, tower layer, routes
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use error_shield::api::middleware::error_handling::{ErrorDispatcher, ErrorHandlingLayer};
//! use error_shield::domain::HttpException;
//!
//! async fn lookup() -> Result<String, HttpException> {
//!     Err(HttpException::not_found("Return not found"))
//! }
//!
//! let app: Router = Router::new()
//!     .route("/v1/returns/{id}", get(lookup))
//!     .layer(ErrorHandlingLayer::new(Arc::new(ErrorDispatcher::default())));
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use api::middleware::error_handling::{
    ErrorDispatcher, ErrorHandlingLayer, RequestContext, SafeResponsePayload,
};
pub use config::Config;
pub use domain::{CaughtError, HttpException};
