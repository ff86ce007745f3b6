//! # Handler abstraction.
//!
//! A [`Handler`] processes messages of one type `M` (and, unless the subscription
//! asks for exact matching, any subtype of `M`). It receives the send's
//! [`CancellationToken`] and should check it in long-running work.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::message::{Envelope, Message};

/// Shared handle to a handler.
pub type HandlerRef<M> = Arc<dyn Handler<M>>;

/// # Asynchronous, cancelable message handler.
///
/// Returning `Err` (or panicking) from an inline handler marks the delivery as
/// failed; delivery still continues to the remaining subscriptions.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use serialbus::{message, Envelope, Handler, HandlerError};
///
/// struct OrderPlaced { total: u64 }
/// message!(OrderPlaced);
///
/// struct Audit;
///
/// #[async_trait]
/// impl Handler<OrderPlaced> for Audit {
///     fn name(&self) -> &str { "audit" }
///
///     async fn handle(&self, msg: Envelope<OrderPlaced>, ctx: CancellationToken) -> Result<(), HandlerError> {
///         if ctx.is_cancelled() {
///             return Err(HandlerError::Canceled);
///         }
///         if msg.total == 0 {
///             return Err(HandlerError::fail("empty order"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<M: Message>: Send + Sync + 'static {
    /// Returns a human-readable handler name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Processes one message.
    async fn handle(&self, message: Envelope<M>, ctx: CancellationToken) -> Result<(), HandlerError>;
}
