//! # Scoped subscription.
//!
//! [`SubscriptionGuard`] unsubscribes when dropped, tying a handler's lifetime to
//! a scope. Like [`Bus::unsubscribe`](crate::Bus::unsubscribe), the removal is
//! queued and takes effect at the next dispatch cycle.

use crate::core::Bus;
use crate::subscriptions::SubscriptionId;

/// Unsubscribes its subscription on drop.
///
/// Holds a [`Bus`] clone, so the dispatch loop stays alive while guards exist.
#[must_use = "dropping the guard unsubscribes immediately"]
#[derive(Debug)]
pub struct SubscriptionGuard {
    bus: Bus,
    id: SubscriptionId,
    armed: bool,
}

impl SubscriptionGuard {
    pub(crate) fn new(bus: Bus, id: SubscriptionId) -> Self {
        Self {
            bus,
            id,
            armed: true,
        }
    }

    /// Id of the guarded subscription.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keeps the subscription alive past the guard and returns its id.
    pub fn detach(mut self) -> SubscriptionId {
        self.armed = false;
        self.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if self.armed {
            self.bus.unsubscribe(self.id);
        }
    }
}
