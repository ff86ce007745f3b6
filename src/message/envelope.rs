//! # Typed view over a delivered message.
//!
//! Handlers registered for `M` receive an [`Envelope<M>`]: it keeps the shared
//! payload alive (so detached handlers can hold it past the dispatch cycle) and
//! derefs to `&M`, which may be a supertype view of the runtime message.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::message::{Message, MessageType};

/// Message handed to a handler registered for `M`.
///
/// ## Example
/// ```
/// use serialbus::{message, Envelope};
///
/// struct Ping { seq: u64 }
/// message!(Ping);
///
/// fn seq(env: &Envelope<Ping>) -> u64 {
///     env.seq // derefs to &Ping
/// }
/// # let _ = seq;
/// ```
pub struct Envelope<M> {
    payload: Arc<dyn Message>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Message> Envelope<M> {
    /// Wraps `payload` if it can be viewed as `M`.
    pub(crate) fn new(payload: Arc<dyn Message>) -> Option<Self> {
        view::<M>(payload.as_ref())?;
        Some(Self {
            payload,
            _marker: PhantomData,
        })
    }

    /// Returns the message viewed as `M`.
    ///
    /// # Panics
    /// Panics if the payload's [`Message::upcast`] stops returning an `M` view it
    /// returned when the envelope was built. Implementations from
    /// [`message!`](crate::message) always answer the same way.
    pub fn get(&self) -> &M {
        match view::<M>(self.payload.as_ref()) {
            Some(m) => m,
            // `new` only accepts payloads that can be viewed as `M`.
            None => unreachable!("envelope holds a payload incompatible with its type"),
        }
    }

    /// Exact runtime type of the delivered message (may be a subtype of `M`).
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// Returns `true` if the runtime message is exactly `M` rather than a subtype.
    pub fn is_exact(&self) -> bool {
        self.message_type() == MessageType::of::<M>()
    }

    /// Shared, type-erased payload (e.g. for re-publishing with [`Bus::send_arc`](crate::Bus::send_arc)).
    pub fn payload(&self) -> &Arc<dyn Message> {
        &self.payload
    }
}

fn view<M: Message>(message: &dyn Message) -> Option<&M> {
    message
        .upcast(TypeId::of::<M>())
        .and_then(|any| any.downcast_ref::<M>())
}

impl<M: Message> Deref for Envelope<M> {
    type Target = M;

    /// Same as [`Envelope::get`], including its panic condition.
    fn deref(&self) -> &M {
        self.get()
    }
}

impl<M> Clone for Envelope<M> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            _marker: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Envelope<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("view", &std::any::type_name::<M>())
            .field("message_type", &self.payload.message_type())
            .finish()
    }
}
