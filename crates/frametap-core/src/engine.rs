//! Typed listener registration on top of a [`NativeEventSource`].

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::events::{Listener, MediaEngineEvent, MediaEngineEventType};
use crate::native::{ListenerId, NativeEventSource, RawCallback, RawListener, SubscriptionId};
use crate::receiver::EventReceiver;
use crate::registry::EventRegistry;

/// Listener registration keyed by media engine event.
///
/// The event marker passed in fixes the listener signature, so
/// `add_listener(OnRenderVideoFrame, &listener)` only accepts a
/// `Listener<OnRenderVideoFrame>`.
pub trait MediaEngineEvents {
    /// Register `listener` for `event`. It receives every subsequent event of
    /// that name until removed. The same listener may be added more than
    /// once; each registration is delivered separately.
    fn add_listener<E: MediaEngineEvent>(&self, event: E, listener: &Listener<E>) -> EventSubscription;

    /// Remove the registrations of this exact listener value under `event`.
    /// Unknown listeners are ignored.
    fn remove_listener<E: MediaEngineEvent>(&self, event: E, listener: &Listener<E>);

    /// Remove every listener of `event`, or of all events when `None`.
    fn remove_all_listeners(&self, event: Option<MediaEngineEventType>);
}

/// Handle for one registration made through [`MediaEngineEvents::add_listener`].
///
/// Dropping the handle leaves the registration in place.
pub struct EventSubscription {
    id: SubscriptionId,
    source: Weak<dyn NativeEventSource>,
}

impl EventSubscription {
    /// Cancel this registration. Other registrations of the same listener
    /// are unaffected. A no-op once the engine is gone.
    pub fn remove(self) {
        if let Some(source) = self.source.upgrade() {
            source.remove_subscription(self.id);
        }
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription").finish_non_exhaustive()
    }
}

/// Media engine event surface backed by a native event source.
#[derive(Clone)]
pub struct MediaEngine {
    source: Arc<dyn NativeEventSource>,
}

impl MediaEngine {
    pub fn new(source: Arc<dyn NativeEventSource>) -> Self {
        Self { source }
    }

    /// Engine over an in-process registry. The returned registry handle is
    /// the emitting side.
    pub fn in_process(registry: EventRegistry) -> (Self, EventRegistry) {
        let engine = Self::new(Arc::new(registry.clone()));
        (engine, registry)
    }

    pub fn listener_count(&self, event: MediaEngineEventType) -> usize {
        self.source.listener_count(event.as_str())
    }

    /// Receive `event` payloads asynchronously instead of through a callback.
    pub fn subscribe<E>(&self, event: E) -> EventReceiver<E>
    where
        E: MediaEngineEvent,
        E::Args: Clone,
    {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<E::Args>();
        let callback: RawCallback = Arc::new(move |payload: &dyn Any| {
            if let Some(args) = payload.downcast_ref::<E::Args>() {
                // A closed receiver has already removed this registration or
                // is about to; dropping the payload is fine.
                let _ = tx.send(args.clone());
            }
        });
        let raw = RawListener::new(ListenerId::of(&callback), callback);
        let subscription = self.register(event, raw);
        EventReceiver::new(rx, subscription)
    }

    fn register<E: MediaEngineEvent>(&self, _event: E, raw: RawListener) -> EventSubscription {
        let id = self.source.add_listener(E::TYPE.as_str(), raw);
        EventSubscription {
            id,
            source: Arc::downgrade(&self.source),
        }
    }

    fn erase<E: MediaEngineEvent>(listener: &Listener<E>) -> RawListener {
        let typed = listener.clone();
        let callback: RawCallback = Arc::new(move |payload: &dyn Any| {
            match payload.downcast_ref::<E::Args>() {
                Some(args) => E::invoke(&*typed, args),
                None => tracing::warn!(
                    event = E::TYPE.as_str(),
                    "payload does not match event, listener skipped"
                ),
            }
        });
        RawListener::new(ListenerId::of(listener), callback)
    }
}

impl MediaEngineEvents for MediaEngine {
    fn add_listener<E: MediaEngineEvent>(&self, event: E, listener: &Listener<E>) -> EventSubscription {
        self.register(event, Self::erase::<E>(listener))
    }

    fn remove_listener<E: MediaEngineEvent>(&self, _event: E, listener: &Listener<E>) {
        self.source.remove_listener(E::TYPE.as_str(), ListenerId::of(listener));
    }

    fn remove_all_listeners(&self, event: Option<MediaEngineEventType>) {
        self.source.remove_all_listeners(event.map(MediaEngineEventType::as_str));
    }
}
