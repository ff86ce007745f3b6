//! # Subscription record.
//!
//! A [`Subscription`] is the immutable description of one registered handler as
//! the dispatch loop sees it: id, registered type, matching mode, execution mode,
//! and a type-erased handler.
//!
//! ## Type erasure
//! ```text
//! HandlerRef<M> ──► erase::<M>() ──► ErasedHandler
//!                                      (Arc<dyn Message>, CancellationToken)
//!                                        ├─ payload viewable as M → handler.handle(Envelope<M>, ctx)
//!                                        └─ otherwise              → Ok(()) (no-op)
//! ```
//! The guard inside the erased closure is a second line of defence: the loop
//! already filters by type before invoking.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::HandlerError;
use crate::handlers::HandlerRef;
use crate::message::{self, Envelope, Message, MessageType};

/// Opaque handle identifying a subscription.
///
/// Generated randomly by [`Bus::subscribe`](crate::Bus::subscribe) unless the caller
/// supplies one via [`SubscribeOptions::with_id`](crate::SubscribeOptions::with_id).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SubscriptionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handler with its message type erased.
pub(crate) type ErasedHandler = Arc<
    dyn Fn(Arc<dyn Message>, CancellationToken) -> BoxFuture<'static, Result<(), HandlerError>>
        + Send
        + Sync,
>;

fn erase<M: Message>(handler: HandlerRef<M>) -> ErasedHandler {
    Arc::new(move |payload: Arc<dyn Message>, ctx: CancellationToken| {
        let handler = Arc::clone(&handler);
        async move {
            match Envelope::<M>::new(payload) {
                Some(env) => handler.handle(env, ctx).await,
                None => Ok(()),
            }
        }
        .boxed()
    })
}

/// One registered handler, as owned by the dispatch loop.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) message_type: MessageType,
    pub(crate) include_derived_types: bool,
    pub(crate) run_detached: bool,
    pub(crate) name: Arc<str>,
    pub(crate) handler: ErasedHandler,
}

impl Subscription {
    /// Builds a subscription for handlers of `M`.
    pub(crate) fn new<M: Message>(
        id: SubscriptionId,
        handler: HandlerRef<M>,
        include_derived_types: bool,
        run_detached: bool,
    ) -> Self {
        Self {
            id,
            message_type: MessageType::of::<M>(),
            include_derived_types,
            run_detached,
            name: Arc::from(handler.name()),
            handler: erase(handler),
        }
    }

    /// Returns `true` if `message` passes this subscription's type filter.
    pub(crate) fn matches(&self, message: &dyn Message) -> bool {
        message::accepts(message, self.message_type, self.include_derived_types)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("message_type", &self.message_type)
            .field("include_derived_types", &self.include_derived_types)
            .field("run_detached", &self.run_detached)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handlers::HandlerFn;

    struct Base;
    struct Derived {
        base: Base,
    }
    struct Other;

    crate::message!(Base);
    crate::message!(Derived: Base => base);
    crate::message!(Other);

    fn counting(calls: Arc<AtomicUsize>) -> HandlerRef<Base> {
        HandlerFn::arc("counting", move |_msg: Envelope<Base>, _ctx: CancellationToken| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        })
    }

    #[test]
    fn subscription_ids_are_unique() {
        assert_ne!(SubscriptionId::new(), SubscriptionId::new());
        let raw = Uuid::new_v4();
        assert_eq!(SubscriptionId::from(raw).as_uuid(), &raw);
    }

    #[test]
    fn matching_follows_derived_flag() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exact = Subscription::new(SubscriptionId::new(), counting(calls.clone()), false, false);
        let poly = Subscription::new(SubscriptionId::new(), counting(calls), true, false);
        let derived = Derived { base: Base };

        assert!(exact.matches(&Base));
        assert!(!exact.matches(&derived));
        assert!(poly.matches(&derived));
        assert!(!poly.matches(&Other));
        assert_eq!(exact.name.as_ref(), "counting");
    }

    #[tokio::test]
    async fn erased_handler_ignores_incompatible_payloads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new(SubscriptionId::new(), counting(calls.clone()), true, false);

        let res = (sub.handler)(Arc::new(Other), CancellationToken::new()).await;
        assert_eq!(res, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let res = (sub.handler)(Arc::new(Derived { base: Base }), CancellationToken::new()).await;
        assert_eq!(res, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
