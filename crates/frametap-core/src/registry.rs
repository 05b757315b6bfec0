use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::events::MediaEngineEvent;
use crate::native::{ListenerId, NativeEventSource, RawListener, SubscriptionId};
use crate::settings::{DEFAULT_MAX_LISTENERS, Settings};

struct Registration {
    subscription: SubscriptionId,
    listener: RawListener,
}

type ListenerMap = HashMap<String, Vec<Registration>>;

/// In-process event source: a name-keyed listener registry plus dispatch.
///
/// Cloning yields another handle onto the same registry. Listeners of one
/// event name run in registration order on the thread that calls `emit`.
#[derive(Clone)]
pub struct EventRegistry {
    listeners: Arc<RwLock<ListenerMap>>,
    max_listeners: usize,
    trace_dispatch: bool,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            max_listeners: DEFAULT_MAX_LISTENERS,
            trace_dispatch: false,
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            max_listeners: settings.max_listeners_per_event,
            trace_dispatch: settings.trace_dispatch,
            ..Self::new()
        }
    }

    /// Deliver `payload` to every listener of `event`.
    ///
    /// Returns how many listeners were invoked. Registrations made or removed
    /// by a listener during dispatch apply from the next call on.
    pub fn emit(&self, event: &str, payload: &dyn Any) -> usize {
        let snapshot: Vec<RawListener> = match self.read().get(event) {
            Some(registrations) => registrations.iter().map(|r| r.listener.clone()).collect(),
            None => return 0,
        };

        if self.trace_dispatch {
            tracing::trace!(event, listeners = snapshot.len(), "dispatching event");
        }

        for listener in &snapshot {
            listener.call(payload);
        }
        snapshot.len()
    }

    pub fn emit_event<E: MediaEngineEvent>(&self, args: &E::Args) -> usize {
        self.emit(E::TYPE.as_str(), args)
    }

    /// Event names that currently have at least one listener.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, ListenerMap> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListenerMap> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeEventSource for EventRegistry {
    fn add_listener(&self, event: &str, listener: RawListener) -> SubscriptionId {
        let subscription = SubscriptionId::new();
        let count = {
            let mut map = self.write();
            let registrations = map.entry(event.to_string()).or_default();
            registrations.push(Registration { subscription, listener });
            registrations.len()
        };

        if self.max_listeners > 0 && count > self.max_listeners {
            tracing::warn!(
                event,
                count,
                max = self.max_listeners,
                "possible listener leak: more listeners than configured maximum"
            );
        }
        tracing::debug!(event, ?subscription, "listener added");
        subscription
    }

    fn remove_listener(&self, event: &str, listener: ListenerId) {
        let mut map = self.write();
        let Some(registrations) = map.get_mut(event) else {
            return;
        };
        let before = registrations.len();
        registrations.retain(|r| r.listener.id() != listener);
        let removed = before - registrations.len();
        if registrations.is_empty() {
            map.remove(event);
        }
        if removed > 0 {
            tracing::debug!(event, removed, "listener removed");
        }
    }

    fn remove_subscription(&self, subscription: SubscriptionId) {
        let mut map = self.write();
        let mut emptied = None;
        for (event, registrations) in map.iter_mut() {
            if let Some(pos) = registrations.iter().position(|r| r.subscription == subscription) {
                registrations.remove(pos);
                tracing::debug!(event = %event, ?subscription, "subscription removed");
                if registrations.is_empty() {
                    emptied = Some(event.clone());
                }
                break;
            }
        }
        if let Some(event) = emptied {
            map.remove(&event);
        }
    }

    fn remove_all_listeners(&self, event: Option<&str>) {
        let mut map = self.write();
        match event {
            Some(event) => {
                if let Some(registrations) = map.remove(event) {
                    tracing::debug!(event, removed = registrations.len(), "all listeners removed");
                }
            }
            None => {
                let removed: usize = map.values().map(Vec::len).sum();
                map.clear();
                tracing::debug!(removed, "all listeners removed for every event");
            }
        }
    }

    fn listener_count(&self, event: &str) -> usize {
        self.read().get(event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::RawCallback;
    use std::sync::Mutex;

    fn recording(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> RawListener {
        let log = log.clone();
        let tag = tag.to_string();
        let callback: RawCallback = Arc::new(move |payload: &dyn Any| {
            let value = payload.downcast_ref::<u32>().copied().unwrap_or_default();
            log.lock().unwrap().push(format!("{tag}:{value}"));
        });
        RawListener::new(ListenerId::of(&callback), callback)
    }

    #[test]
    fn emit_without_listeners_delivers_nothing() {
        let registry = EventRegistry::new();
        assert_eq!(registry.emit("onRenderVideoFrame", &1u32), 0);
    }

    #[test]
    fn emit_follows_insertion_order() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add_listener("e", recording(&log, "a"));
        registry.add_listener("e", recording(&log, "b"));
        registry.add_listener("other", recording(&log, "c"));

        assert_eq!(registry.emit("e", &7u32), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:7", "b:7"]);
    }

    #[test]
    fn remove_listener_matches_identity_only() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recording(&log, "a");
        let b = recording(&log, "b");
        registry.add_listener("e", a.clone());
        registry.add_listener("e", b);

        registry.remove_listener("e", a.id());
        registry.emit("e", &1u32);

        assert_eq!(*log.lock().unwrap(), vec!["b:1"]);
    }

    #[test]
    fn remove_listener_under_other_event_is_noop() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recording(&log, "a");
        registry.add_listener("e", a.clone());

        registry.remove_listener("other", a.id());

        assert_eq!(registry.listener_count("e"), 1);
    }

    #[test]
    fn remove_subscription_removes_one_registration() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recording(&log, "a");
        let first = registry.add_listener("e", a.clone());
        registry.add_listener("e", a);

        registry.remove_subscription(first);
        assert_eq!(registry.listener_count("e"), 1);

        registry.remove_subscription(first);
        assert_eq!(registry.listener_count("e"), 1);
    }

    #[test]
    fn remove_all_for_one_event() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add_listener("e", recording(&log, "a"));
        registry.add_listener("f", recording(&log, "b"));

        registry.remove_all_listeners(Some("e"));

        assert_eq!(registry.listener_count("e"), 0);
        assert_eq!(registry.listener_count("f"), 1);
        assert_eq!(registry.event_names(), vec!["f".to_string()]);
    }

    #[test]
    fn remove_all_for_every_event() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add_listener("e", recording(&log, "a"));
        registry.add_listener("f", recording(&log, "b"));

        registry.remove_all_listeners(None);

        assert!(registry.event_names().is_empty());
    }

    #[test]
    fn listener_may_remove_itself_during_dispatch() {
        let registry = EventRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let inner = registry.clone();
        let counter = hits.clone();
        let own = slot.clone();
        let callback: RawCallback = Arc::new(move |_: &dyn Any| {
            *counter.lock().unwrap() += 1;
            if let Some(id) = own.lock().unwrap().take() {
                inner.remove_subscription(id);
            }
        });
        let id = registry.add_listener("e", RawListener::new(ListenerId::of(&callback), callback));
        *slot.lock().unwrap() = Some(id);

        assert_eq!(registry.emit("e", &()), 1);
        assert_eq!(registry.emit("e", &()), 0);
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn exceeding_max_listeners_still_registers() {
        let registry = EventRegistry::with_settings(&Settings {
            max_listeners_per_event: 1,
            ..Settings::default()
        });
        let log = Arc::new(Mutex::new(Vec::new()));
        registry.add_listener("e", recording(&log, "a"));
        registry.add_listener("e", recording(&log, "b"));

        assert_eq!(registry.listener_count("e"), 2);
    }

    #[test]
    fn clones_share_state() {
        let registry = EventRegistry::new();
        let other = registry.clone();
        let log = Arc::new(Mutex::new(Vec::new()));
        other.add_listener("e", recording(&log, "a"));

        assert_eq!(registry.emit("e", &2u32), 1);
    }
}
