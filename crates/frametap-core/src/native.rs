//! Contract for the untyped native event source.
//!
//! The native layer knows events only by string name and stores callbacks
//! it cannot see into. Anything that satisfies [`NativeEventSource`] can sit
//! under the typed façade: a platform binding, or the in-process
//! [`EventRegistry`](crate::registry::EventRegistry).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Native handle for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of a listener value: the address of its shared allocation.
///
/// The registry keeps the allocation alive for as long as the listener is
/// registered, so an id cannot be reused while it is still meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    pub fn of<T: ?Sized>(listener: &Arc<T>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

/// Type-erased callback stored by the native layer.
pub type RawCallback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// A listener as the native layer sees it.
#[derive(Clone)]
pub struct RawListener {
    id: ListenerId,
    callback: RawCallback,
}

impl RawListener {
    pub fn new(id: ListenerId, callback: RawCallback) -> Self {
        Self { id, callback }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn call(&self, payload: &dyn Any) {
        (self.callback)(payload)
    }
}

impl fmt::Debug for RawListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawListener").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Registration surface of the native event emitter.
///
/// Implementations must invoke listeners of one event name in insertion
/// order. Removing something that is not registered is a no-op.
pub trait NativeEventSource: Send + Sync {
    fn add_listener(&self, event: &str, listener: RawListener) -> SubscriptionId;

    /// Remove every registration of `listener` under `event`.
    fn remove_listener(&self, event: &str, listener: ListenerId);

    /// Remove exactly one registration.
    fn remove_subscription(&self, subscription: SubscriptionId);

    /// Remove all registrations for `event`, or for every event when `None`.
    fn remove_all_listeners(&self, event: Option<&str>);

    fn listener_count(&self, event: &str) -> usize;
}
