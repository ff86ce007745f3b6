//! # Message trait and runtime type tags.
//!
//! Rust has no runtime subclassing, so a message hierarchy is declared explicitly:
//! every [`Message`] reports its exact [`MessageType`] and can *upcast* itself to
//! any of its declared supertypes.
//!
//! ## Hierarchy by composition
//! A subtype embeds its parent in a field and forwards upcasts to it:
//! ```text
//! struct Base      { .. }                 message!(Base);
//! struct Derived   { base: Base, .. }     message!(Derived: Base => base);
//! struct Leaf      { parent: Derived }    message!(Leaf: Derived => parent);
//!
//! Leaf.upcast(Leaf)    → Some(&Leaf)
//! Leaf.upcast(Derived) → Some(&leaf.parent)
//! Leaf.upcast(Base)    → Some(&leaf.parent.base)
//! Base.upcast(Leaf)    → None
//! ```
//!
//! ## Matching
//! - **exact**: `message.message_type() == registered`
//! - **polymorphic**: `message.upcast(registered.id()).is_some()`

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime type tag of a message.
///
/// Compared by [`TypeId`] only; the name is kept for logs.
#[derive(Clone, Copy, Debug)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Returns the tag of `M`.
    pub fn of<M: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type name (for logs; not guaranteed stable across compilers).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A value that can travel over a [`Bus`](crate::Bus).
///
/// Usually implemented with the [`message!`](crate::message) macro. A manual
/// implementation must keep two rules:
/// - `message_type()` returns `MessageType::of::<Self>()`;
/// - `upcast(t)` returns `Some` exactly when `t` is `Self` or one of its supertypes,
///   and the returned value downcasts to that type.
///
/// # Example
/// ```
/// use std::any::TypeId;
/// use serialbus::{message, Message, MessageType};
///
/// struct Base { id: u32 }
/// struct Derived { base: Base }
///
/// message!(Base);
/// message!(Derived: Base => base);
///
/// let d = Derived { base: Base { id: 7 } };
/// assert_eq!(d.message_type(), MessageType::of::<Derived>());
///
/// let as_base = d.upcast(TypeId::of::<Base>()).and_then(|a| a.downcast_ref::<Base>());
/// assert_eq!(as_base.map(|b| b.id), Some(7));
/// assert!(Base { id: 1 }.upcast(TypeId::of::<Derived>()).is_none());
/// ```
pub trait Message: Send + Sync + 'static {
    /// Exact runtime type of this message.
    fn message_type(&self) -> MessageType;

    /// Views this message as `target` if it is that type or a subtype of it.
    fn upcast(&self, target: TypeId) -> Option<&dyn Any>;
}

/// Declares a message type, optionally as a subtype of another message.
///
/// - `message!(T)`: root message type.
/// - `message!(T: Parent => field)`: `T` is a subtype of `Parent`, which is
///   embedded in `T::field`. Hierarchies are transitive.
#[macro_export]
macro_rules! message {
    ($ty:ty : $parent:ty => $field:ident) => {
        impl $crate::Message for $ty {
            fn message_type(&self) -> $crate::MessageType {
                $crate::MessageType::of::<$ty>()
            }

            fn upcast(
                &self,
                target: ::std::any::TypeId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<$ty>() {
                    return ::std::option::Option::Some(self);
                }
                <$parent as $crate::Message>::upcast(&self.$field, target)
            }
        }
    };
    ($ty:ty) => {
        impl $crate::Message for $ty {
            fn message_type(&self) -> $crate::MessageType {
                $crate::MessageType::of::<$ty>()
            }

            fn upcast(
                &self,
                target: ::std::any::TypeId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if target == ::std::any::TypeId::of::<$ty>() {
                    ::std::option::Option::Some(self)
                } else {
                    ::std::option::Option::None
                }
            }
        }
    };
}

/// Type filter applied by a subscription.
pub(crate) fn accepts(message: &dyn Message, registered: MessageType, include_derived: bool) -> bool {
    if include_derived {
        message.upcast(registered.id()).is_some()
    } else {
        message.message_type() == registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base;
    struct Derived {
        base: Base,
    }
    struct Leaf {
        parent: Derived,
    }
    struct Unrelated;

    crate::message!(Base);
    crate::message!(Derived: Base => base);
    crate::message!(Leaf: Derived => parent);
    crate::message!(Unrelated);

    fn leaf() -> Leaf {
        Leaf {
            parent: Derived { base: Base },
        }
    }

    #[test]
    fn exact_match_ignores_hierarchy() {
        let base = MessageType::of::<Base>();
        assert!(accepts(&Base, base, false));
        assert!(!accepts(&leaf(), base, false));
        assert!(!accepts(&Unrelated, base, false));
    }

    #[test]
    fn polymorphic_match_is_transitive() {
        let l = leaf();
        assert!(accepts(&l, MessageType::of::<Leaf>(), true));
        assert!(accepts(&l, MessageType::of::<Derived>(), true));
        assert!(accepts(&l, MessageType::of::<Base>(), true));
        assert!(!accepts(&Base, MessageType::of::<Derived>(), true));
        assert!(!accepts(&Unrelated, MessageType::of::<Base>(), true));
    }

    #[test]
    fn upcast_returns_embedded_parent() {
        let l = leaf();
        let base = l.upcast(TypeId::of::<Base>()).expect("leaf is a base");
        assert!(base.downcast_ref::<Base>().is_some());
        let derived = l.upcast(TypeId::of::<Derived>()).expect("leaf is derived");
        assert!(derived.downcast_ref::<Derived>().is_some());
    }

    #[test]
    fn type_tags_compare_by_id() {
        assert_eq!(Base.message_type(), MessageType::of::<Base>());
        assert_ne!(leaf().message_type(), MessageType::of::<Base>());
        assert!(MessageType::of::<Leaf>().name().ends_with("Leaf"));
    }
}
