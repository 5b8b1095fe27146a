//! Error handling middleware
//!
//! Every error raised while serving a request ends here and leaves as a
//! client-safe JSON body. Full detail goes only to the log sink.
//!
//! - config.rs: Configuration structures
//! - dispatcher.rs: Classify, log and answer one caught error
//! - composer.rs: Safe response payload and the response write
//! - middleware.rs: Tower layer recovering raised errors and panics

pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod middleware;

pub use composer::{ResponseComposer, SafeResponsePayload};
pub use config::ErrorHandlingConfig;
pub use dispatcher::{ErrorDispatcher, RequestContext};
pub use middleware::{create_error_handling_middleware, ErrorHandlingLayer};
