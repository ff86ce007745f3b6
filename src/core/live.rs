//! # Live subscription list.
//!
//! The authoritative, ordered set of active subscriptions. Owned by exactly one
//! dispatch loop and never shared, so it needs no synchronization.
//!
//! ## Rules
//! - Registration order is delivery order.
//! - Ids are unique: a subscribe whose id is already live is rejected.
//! - Unknown ids in unsubscribe are ignored.
//! - Changes are applied only between dispatch cycles (by the loop).
//! - Changes are applied in enqueue order. Within one batch, an unsubscribe of
//!   `X` also removes a subscribe of `X` queued before it: with `X` live, the
//!   batch `[Subscribe(X), Unsubscribe(X)]` rejects the new subscribe as a
//!   duplicate and then removes the old one, leaving no `X` live.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::invoke;
use crate::core::request::Change;
use crate::message::Message;
use crate::subscriptions::Subscription;

/// Loop-owned list of active subscriptions.
pub(crate) struct LiveSubscriptions {
    bus: Arc<str>,
    subs: Vec<Subscription>,
}

impl LiveSubscriptions {
    pub(crate) fn new(bus: Arc<str>) -> Self {
        Self {
            bus,
            subs: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subs.len()
    }

    /// Applies one queued change.
    pub(crate) fn apply(&mut self, change: Change) {
        match change {
            Change::Subscribe(sub) => {
                if self.subs.iter().any(|s| s.id == sub.id) {
                    warn!(
                        bus = %self.bus,
                        subscription = %sub.id,
                        handler = %sub.name,
                        "subscription id already live; new subscription rejected"
                    );
                    return;
                }
                trace!(
                    bus = %self.bus,
                    subscription = %sub.id,
                    handler = %sub.name,
                    message_type = %sub.message_type,
                    detached = sub.run_detached,
                    derived = sub.include_derived_types,
                    "subscription added"
                );
                self.subs.push(sub);
            }
            Change::Unsubscribe(id) => {
                let before = self.subs.len();
                self.subs.retain(|s| s.id != id);
                if self.subs.len() == before {
                    trace!(bus = %self.bus, subscription = %id, "unsubscribe for unknown id ignored");
                } else {
                    trace!(bus = %self.bus, subscription = %id, "subscription removed");
                }
            }
        }
    }

    /// Delivers one message to every matching subscription, in registration order.
    ///
    /// Returns the aggregate result: `false` if cancellation was observed or any
    /// inline handler failed, `true` otherwise (including when nothing matched).
    pub(crate) async fn deliver(&self, payload: &Arc<dyn Message>, cancel: &CancellationToken) -> bool {
        let message_type = payload.message_type();
        let mut ok = true;
        let mut matched = 0usize;

        for sub in &self.subs {
            if !sub.matches(payload.as_ref()) {
                continue;
            }
            if cancel.is_cancelled() {
                debug!(
                    bus = %self.bus,
                    message_type = %message_type,
                    delivered = matched,
                    "send cancelled; remaining subscriptions skipped"
                );
                ok = false;
                break;
            }
            matched += 1;

            if sub.run_detached {
                invoke::spawn_detached(Arc::clone(&self.bus), sub, Arc::clone(payload), cancel.clone());
                continue;
            }

            if let Err(err) = invoke::run_inline(sub, Arc::clone(payload), cancel.clone()).await {
                warn!(
                    bus = %self.bus,
                    subscription = %sub.id,
                    handler = %sub.name,
                    message_type = %message_type,
                    label = err.as_label(),
                    error = %err.as_message(),
                    "inline handler failed"
                );
                ok = false;
            }
        }

        debug!(
            bus = %self.bus,
            message_type = %message_type,
            matched,
            ok,
            "message dispatched"
        );
        ok
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::{HandlerFn, HandlerRef};
    use crate::message::Envelope;
    use crate::subscriptions::SubscriptionId;

    struct Note(&'static str);
    crate::message!(Note);

    fn recorder(log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str, id: SubscriptionId) -> Subscription {
        let handler: HandlerRef<Note> = HandlerFn::arc(tag, move |msg: Envelope<Note>, _ctx: CancellationToken| {
            if let Ok(mut log) = log.lock() {
                log.push(tag);
                log.push(msg.0);
            }
            async { Ok::<_, HandlerError>(()) }
        });
        Subscription::new(id, handler, true, false)
    }

    #[tokio::test]
    async fn subscribe_then_unsubscribe_in_one_batch_leaves_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut live = LiveSubscriptions::new(Arc::from("t"));
        let id = SubscriptionId::new();

        live.apply(Change::Subscribe(recorder(log.clone(), "a", id)));
        live.apply(Change::Unsubscribe(id));
        assert_eq!(live.len(), 0);

        let payload: Arc<dyn Message> = Arc::new(Note("x"));
        assert!(live.deliver(&payload, &CancellationToken::new()).await);
        assert!(log.lock().map(|l| l.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn duplicate_id_keeps_first_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut live = LiveSubscriptions::new(Arc::from("t"));
        let id = SubscriptionId::new();

        live.apply(Change::Subscribe(recorder(log.clone(), "first", id)));
        live.apply(Change::Subscribe(recorder(log.clone(), "second", id)));
        assert_eq!(live.len(), 1);

        let payload: Arc<dyn Message> = Arc::new(Note("m"));
        assert!(live.deliver(&payload, &CancellationToken::new()).await);
        assert_eq!(*log.lock().expect("lock"), vec!["first", "m"]);
    }

    #[tokio::test]
    async fn resubscribe_then_unsubscribe_of_live_id_leaves_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut live = LiveSubscriptions::new(Arc::from("t"));
        let id = SubscriptionId::new();
        live.apply(Change::Subscribe(recorder(log.clone(), "old", id)));

        live.apply(Change::Subscribe(recorder(log.clone(), "new", id)));
        live.apply(Change::Unsubscribe(id));
        assert_eq!(live.len(), 0);

        let payload: Arc<dyn Message> = Arc::new(Note("m"));
        assert!(live.deliver(&payload, &CancellationToken::new()).await);
        assert!(log.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn delivery_follows_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut live = LiveSubscriptions::new(Arc::from("t"));
        for tag in ["one", "two", "three"] {
            live.apply(Change::Subscribe(recorder(log.clone(), tag, SubscriptionId::new())));
        }
        live.apply(Change::Unsubscribe(SubscriptionId::new()));

        let payload: Arc<dyn Message> = Arc::new(Note("m"));
        assert!(live.deliver(&payload, &CancellationToken::new()).await);
        assert_eq!(
            *log.lock().expect("lock"),
            vec!["one", "m", "two", "m", "three", "m"]
        );
    }

    #[tokio::test]
    async fn cancelled_send_with_no_match_still_succeeds() {
        struct Unrelated;
        crate::message!(Unrelated);

        let log = Arc::new(Mutex::new(Vec::new()));
        let mut live = LiveSubscriptions::new(Arc::from("t"));
        live.apply(Change::Subscribe(recorder(log, "a", SubscriptionId::new())));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let payload: Arc<dyn Message> = Arc::new(Unrelated);
        assert!(live.deliver(&payload, &cancel).await);
    }
}
