//! # Invoke one handler for one message.
//!
//! Executes a subscription's handler either inline (awaited by the dispatch loop)
//! or detached (spawned, unobserved), isolating errors and panics.
//!
//! ## Flow
//! ```text
//! Inline:
//!   handler(payload, ctx) ─► catch_unwind ─► Ok(())            → delivery continues
//!                                         ├► Err(e)            → Err(e), delivery continues
//!                                         └► panic             → Err(Panicked), delivery continues
//!
//! Detached:
//!   tokio::spawn(handler(payload, ctx) ─► catch_unwind) ─► any failure is logged and dropped
//! ```
//!
//! ## Rules
//! - Nothing raised by a handler ever unwinds into the dispatch loop.
//! - Detached outcomes never reach the aggregate result.
//! - No timeout: a handler that never completes stalls its caller (the loop, if inline).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::HandlerError;
use crate::message::Message;
use crate::subscriptions::Subscription;

/// Runs `sub`'s handler and waits for it.
///
/// Panics are caught and reported as [`HandlerError::Panicked`].
pub(crate) async fn run_inline(
    sub: &Subscription,
    payload: Arc<dyn Message>,
    ctx: CancellationToken,
) -> Result<(), HandlerError> {
    let fut = (sub.handler)(payload, ctx);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(HandlerError::from_panic(panic)),
    }
}

/// Spawns `sub`'s handler on an untracked task and returns immediately.
pub(crate) fn spawn_detached(
    bus: Arc<str>,
    sub: &Subscription,
    payload: Arc<dyn Message>,
    ctx: CancellationToken,
) {
    let handler = Arc::clone(&sub.handler);
    let id = sub.id;
    let name = Arc::clone(&sub.name);
    let message_type = payload.message_type();

    tokio::spawn(async move {
        let res = match AssertUnwindSafe(handler(payload, ctx)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => Err(HandlerError::from_panic(panic)),
        };
        if let Err(err) = res {
            debug!(
                bus = %bus,
                subscription = %id,
                handler = %name,
                message_type = %message_type,
                label = err.as_label(),
                error = %err.as_message(),
                "detached handler failed; ignored"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{HandlerFn, HandlerRef};
    use crate::message::Envelope;
    use crate::subscriptions::SubscriptionId;

    struct Job(u32);
    crate::message!(Job);

    fn sub_of(handler: HandlerRef<Job>) -> Subscription {
        Subscription::new(SubscriptionId::new(), handler, true, false)
    }

    #[tokio::test]
    async fn inline_error_is_returned() {
        let sub = sub_of(HandlerFn::arc("fails", |msg: Envelope<Job>, _ctx: CancellationToken| async move {
            Err::<(), _>(HandlerError::fail(format!("job {}", msg.0)))
        }));
        let res = run_inline(&sub, Arc::new(Job(4)), CancellationToken::new()).await;
        assert_eq!(res, Err(HandlerError::fail("job 4")));
    }

    #[tokio::test]
    async fn inline_panic_is_caught() {
        let sub = sub_of(HandlerFn::arc("panics", |_msg: Envelope<Job>, _ctx: CancellationToken| async move {
            if true {
                panic!("handler exploded");
            }
            Ok::<_, HandlerError>(())
        }));
        let res = run_inline(&sub, Arc::new(Job(1)), CancellationToken::new()).await;
        assert_eq!(
            res,
            Err(HandlerError::Panicked {
                info: "handler exploded".into()
            })
        );
    }

    #[tokio::test]
    async fn detached_handler_runs_and_panic_stays_contained() {
        let (tx, rx) = tokio::sync::oneshot::channel::<u32>();
        let tx = std::sync::Mutex::new(Some(tx));
        let sub = sub_of(HandlerFn::arc("detached", move |msg: Envelope<Job>, _ctx: CancellationToken| {
            let sent = tx.lock().ok().and_then(|mut slot| slot.take()).map(|tx| tx.send(msg.0));
            async move {
                if sent.is_some() {
                    panic!("after reporting");
                }
                Ok::<_, HandlerError>(())
            }
        }));

        spawn_detached(Arc::from("test"), &sub, Arc::new(Job(11)), CancellationToken::new());
        let got = tokio::time::timeout(std::time::Duration::from_secs(1), rx)
            .await
            .expect("detached handler did not run")
            .expect("sender dropped");
        assert_eq!(got, 11);
    }
}
