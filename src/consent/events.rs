//! Lifecycle notifications.
//!
//! Each consent instance owns one [`EventBus`]; clones share its listener
//! registry, nothing is process-global. Delivery is synchronous and in
//! subscription order, and listeners cannot fail the emitter.

use crate::base::consenterror::ConsentError;
use crate::consent::preferences::{EncodedPreferences, LoadState, PreferenceRecord};
use crate::consent::sweeper::SweepReport;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Events emitted by the consent core.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentEvent {
    /// Preferences resolved; carries the stored (`"on"`/`"off"`) form.
    PreferencesLoaded(EncodedPreferences),
    /// The in-memory record was replaced.
    PreferencesSet(PreferenceRecord),
    /// The record was written to the preference cookie.
    PreferencesSaved(EncodedPreferences),
    /// Initialization finished, before the first sweep.
    Initialized { source: LoadState },
    /// A sweep completed.
    CookiesSwept(SweepReport),
    /// Configuration was rejected; no instance was created.
    ConfigInvalid(ConsentError),
}

/// Discriminant of [`ConsentEvent`], used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PreferencesLoaded,
    PreferencesSet,
    PreferencesSaved,
    Initialized,
    CookiesSwept,
    ConfigInvalid,
}

impl ConsentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ConsentEvent::PreferencesLoaded(_) => EventKind::PreferencesLoaded,
            ConsentEvent::PreferencesSet(_) => EventKind::PreferencesSet,
            ConsentEvent::PreferencesSaved(_) => EventKind::PreferencesSaved,
            ConsentEvent::Initialized { .. } => EventKind::Initialized,
            ConsentEvent::CookiesSwept(_) => EventKind::CookiesSwept,
            ConsentEvent::ConfigInvalid(_) => EventKind::ConfigInvalid,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(&ConsentEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    // None = every event
    kind: Option<EventKind>,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
}

/// Per-instance event bus.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one kind of event.
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&ConsentEvent) + Send + Sync + 'static,
    {
        self.register(Some(kind), Arc::new(listener))
    }

    /// Listen for every event.
    pub fn subscribe_all<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ConsentEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(listener))
    }

    fn register(&self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Registration { id, kind, listener });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .registry
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        before != listeners.len()
    }

    /// Deliver `event` to every matching listener, in subscription order.
    pub fn emit(&self, event: ConsentEvent) {
        let kind = event.kind();

        // Snapshot so listeners may subscribe/unsubscribe while handling.
        let targets: Vec<Listener> = self
            .registry
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|r| r.kind.map_or(true, |k| k == kind))
            .map(|r| r.listener.clone())
            .collect();

        tracing::trace!(?kind, listeners = targets.len(), "emitting consent event");
        for listener in targets {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_filtered_delivery() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(EventKind::PreferencesSaved, move |e| {
            sink.lock().unwrap().push(e.kind())
        });

        bus.emit(ConsentEvent::PreferencesSet(PreferenceRecord::new()));
        bus.emit(ConsentEvent::PreferencesSaved(EncodedPreferences::new()));

        assert_eq!(*seen.lock().unwrap(), vec![EventKind::PreferencesSaved]);
    }

    #[test]
    fn test_subscription_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let sink = seen.clone();
            bus.subscribe_all(move |_| sink.lock().unwrap().push(tag));
        }
        bus.emit(ConsentEvent::Initialized {
            source: LoadState::LoadedFromDefaults,
        });

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe_all(|_| {});
        assert_eq!(bus.listener_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_instances_do_not_share_listeners() {
        let a = EventBus::new();
        let b = EventBus::new();
        a.subscribe_all(|_| {});
        assert_eq!(b.listener_count(), 0);
        assert_eq!(a.clone().listener_count(), 1);
    }
}
