//! Type-erased action payloads.
//!
//! A proposal's action sequence is a heterogeneous bag: the engine never
//! inspects payload contents, and third-party families define payload
//! types the core has never heard of.  Consumers must declare the type
//! they expect at every access and get a loud failure on mismatch.

use std::{any::Any, fmt};

/// A single payload in a proposal's action sequence.
///
/// Blanket-implemented for every sendable `Debug` type, so action
/// families just define plain structs.  The downcast surface exists for
/// the executable's typed accessors; families never call it directly.
pub trait Action: Any + fmt::Debug + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Type name, for diagnostics only.
    fn kind(&self) -> &'static str;
}

impl<T> Action for T
where
    T: Any + fmt::Debug + Send,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn kind(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
