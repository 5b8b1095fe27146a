use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{extract::Request, response::Response};
use futures_util::FutureExt;

use super::dispatcher::{ErrorDispatcher, RequestContext};
use crate::api::errors::RaisedError;
use crate::domain::CaughtError;

/// Error handling middleware layer
#[derive(Clone)]
pub struct ErrorHandlingLayer {
    dispatcher: Arc<ErrorDispatcher>,
}

impl ErrorHandlingLayer {
    pub fn new(dispatcher: Arc<ErrorDispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl<S> tower::Layer<S> for ErrorHandlingLayer
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Service = ErrorHandlingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorHandlingService {
            inner,
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

/// Error handling service wrapper
#[derive(Clone)]
pub struct ErrorHandlingService<S> {
    inner: S,
    dispatcher: Arc<ErrorDispatcher>,
}

impl<S> tower::Service<Request> for ErrorHandlingService<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let dispatcher = Arc::clone(&self.dispatcher);

        Box::pin(async move {
            let context = RequestContext::from_request(&req);

            let outcome = AssertUnwindSafe(inner.call(req)).catch_unwind().await;

            match outcome {
                Ok(Ok(mut response)) => match response.extensions_mut().remove::<RaisedError>() {
                    Some(raised) => Ok(dispatcher.dispatch(raised.error(), &context)),
                    None => Ok(response),
                },
                Ok(Err(err)) => Err(err),
                Err(payload) => {
                    let error = CaughtError::from_panic(payload);
                    Ok(dispatcher.dispatch(&error, &context))
                }
            }
        })
    }
}

/// Create error handling middleware
pub fn create_error_handling_middleware(dispatcher: Arc<ErrorDispatcher>) -> ErrorHandlingLayer {
    ErrorHandlingLayer::new(dispatcher)
}
