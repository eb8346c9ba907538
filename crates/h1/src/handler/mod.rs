//! Request handlers.
//!
//! A [`Handler`] receives the parsed [`Request`] together with a [`ResponseSink`].
//! It either buffers a body through [`ResponseSink::write`], leaving the connection to
//! send it as a `200 OK`, or takes over the [`ResponseWriter`](crate::connection::ResponseWriter)
//! through [`ResponseSink::writer`] to stream its own response.
//!
//! Returning a [`HandlerError`] before anything was written produces a response with
//! the error's status and message.

mod error;

use std::future::Future;

use async_trait::async_trait;

use crate::connection::ResponseSink;
use crate::protocol::Request;

pub use error::HandlerError;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: Request, sink: &mut ResponseSink<'_>) -> Result<(), HandlerError>;
}

/// A [`Handler`] built from an async function returning the body to send.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut, B> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<B, HandlerError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    async fn call(&self, request: Request, sink: &mut ResponseSink<'_>) -> Result<(), HandlerError> {
        let body = (self.f)(request).await?;
        sink.write(body.as_ref());
        Ok(())
    }
}

pub fn make_handler<F, Fut, B>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Result<B, HandlerError>>,
    B: AsRef<[u8]>,
{
    HandlerFn { f }
}
