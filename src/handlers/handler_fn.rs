//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Envelope<M>, CancellationToken) -> Fut`,
//! producing a fresh future per delivery. Shared state must be captured
//! explicitly (e.g. `Arc<...>`); nothing is mutated between deliveries.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use serialbus::{message, Envelope, Handler, HandlerError, HandlerFn, HandlerRef};
//!
//! struct Tick;
//! message!(Tick);
//!
//! let h: HandlerRef<Tick> = HandlerFn::arc("ticker", |_msg: Envelope<Tick>, _ctx: CancellationToken| async {
//!     Ok::<_, HandlerError>(())
//! });
//! assert_eq!(h.name(), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::handlers::handler::Handler;
use crate::message::{Envelope, Message};

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<M, F, Fut> Handler<M> for HandlerFn<F>
where
    M: Message,
    F: Fn(Envelope<M>, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, message: Envelope<M>, ctx: CancellationToken) -> Result<(), HandlerError> {
        (self.f)(message, ctx).await
    }
}
