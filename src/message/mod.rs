//! Message typing: type tags, the subtype capability, and typed envelopes.
//!
//! ## Contents
//! - [`Message`], [`MessageType`] runtime type tag and upcast capability
//! - [`message!`](crate::message) declares message types and their parents
//! - [`Envelope`] typed view handed to handlers

mod envelope;
mod kind;

pub use envelope::Envelope;
pub use kind::{Message, MessageType};

pub(crate) use kind::accepts;
