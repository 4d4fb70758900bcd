//! Event listeners
//!
//! A registry of listeners keyed by event type, standing in for the
//! browser's `addEventListener` / `removeEventListener` pair. Every
//! registration returns a [`ListenerId`] so it can be removed exactly once,
//! and the registry keeps lifetime counters so callers can assert that
//! mount/unmount cycles leave nothing behind.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex};

/// Event type identifier
pub type EventType = u32;

/// Event types the animation pipeline listens to
pub mod event_types {
    use super::EventType;

    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_LEAVE: EventType = 5;
    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
    /// Intersection-observer style visibility change
    pub const VISIBILITY: EventType = 45;

    // Element lifecycle events
    pub const MOUNT: EventType = 60;
    pub const UNMOUNT: EventType = 61;

    /// Human-readable name, used in log output
    pub fn name(event_type: EventType) -> &'static str {
        match event_type {
            POINTER_MOVE => "pointermove",
            POINTER_LEAVE => "pointerleave",
            SCROLL => "scroll",
            RESIZE => "resize",
            VISIBILITY => "visibility",
            MOUNT => "mount",
            UNMOUNT => "unmount",
            _ => "unknown",
        }
    }
}

new_key_type! {
    /// Handle returned by [`ListenerRegistry::add_listener`]
    pub struct ListenerId;
}

/// An event with associated data
#[derive(Clone, Debug)]
pub struct Event {
    pub event_type: EventType,
    pub data: EventData,
}

impl Event {
    pub fn new(event_type: EventType, data: EventData) -> Self {
        Self { event_type, data }
    }

    pub fn scroll(x: f32, y: f32) -> Self {
        Self::new(event_types::SCROLL, EventData::Scroll { x, y })
    }

    pub fn resize(width: f32, height: f32) -> Self {
        Self::new(event_types::RESIZE, EventData::Resize { width, height })
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::new(event_types::POINTER_MOVE, EventData::Pointer { x, y })
    }

    pub fn pointer_leave() -> Self {
        Self::new(event_types::POINTER_LEAVE, EventData::None)
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq)]
pub enum EventData {
    /// Absolute scroll offsets of the document
    Scroll { x: f32, y: f32 },
    /// New viewport dimensions
    Resize { width: f32, height: f32 },
    /// Pointer position in document coordinates
    Pointer { x: f32, y: f32 },
    None,
}

/// Listener callback type
pub type EventHandler = Box<dyn Fn(&Event) + Send + Sync>;

struct Listener {
    event_type: EventType,
    handler: EventHandler,
}

/// Registry of event listeners
pub struct ListenerRegistry {
    listeners: SlotMap<ListenerId, Listener>,
    /// Dispatch order per event type (insertion order)
    by_type: FxHashMap<EventType, Vec<ListenerId>>,
    total_added: u64,
    total_removed: u64,
}

/// Registry shared between the host and every mounted pipeline
pub type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            listeners: SlotMap::with_key(),
            by_type: FxHashMap::default(),
            total_added: 0,
            total_removed: 0,
        }
    }

    /// Create a registry wrapped for sharing
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Register a listener for an event type
    pub fn add_listener<F>(&mut self, event_type: EventType, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.listeners.insert(Listener {
            event_type,
            handler: Box::new(handler),
        });
        self.by_type.entry(event_type).or_default().push(id);
        self.total_added += 1;
        tracing::trace!(event = event_types::name(event_type), "listener added");
        id
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(listener) = self.listeners.remove(id) else {
            return false;
        };
        if let Some(ids) = self.by_type.get_mut(&listener.event_type) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_type.remove(&listener.event_type);
            }
        }
        self.total_removed += 1;
        tracing::trace!(
            event = event_types::name(listener.event_type),
            "listener removed"
        );
        true
    }

    /// Dispatch an event to every listener of its type, in registration order.
    ///
    /// Handlers must not call back into this registry while it is borrowed.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &Event) -> usize {
        let Some(ids) = self.by_type.get(&event.event_type) else {
            return 0;
        };
        let mut fired = 0;
        for id in ids {
            if let Some(listener) = self.listeners.get(*id) {
                (listener.handler)(event);
                fired += 1;
            }
        }
        fired
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    /// Number of live listeners for an event type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).map_or(0, Vec::len)
    }

    /// Number of live listeners across all event types
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Registrations made over the registry's lifetime
    pub fn total_added(&self) -> u64 {
        self.total_added
    }

    /// Removals made over the registry's lifetime
    pub fn total_removed(&self) -> u64 {
        self.total_removed
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("live", &self.listeners.len())
            .field("total_added", &self.total_added)
            .field("total_removed", &self.total_removed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatch_reaches_only_matching_type() {
        let mut registry = ListenerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        registry.add_listener(event_types::SCROLL, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(registry.dispatch(&Event::scroll(0.0, 10.0)), 1);
        assert_eq!(registry.dispatch(&Event::resize(800.0, 600.0)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_preserves_registration_order() {
        let mut registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            registry.add_listener(event_types::RESIZE, move |_| {
                order.lock().unwrap().push(i);
            });
        }

        registry.dispatch(&Event::resize(1.0, 1.0));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn remove_is_exactly_once() {
        let mut registry = ListenerRegistry::new();
        let id = registry.add_listener(event_types::SCROLL, |_| {});

        assert!(registry.remove_listener(id));
        assert!(!registry.remove_listener(id));
        assert_eq!(registry.listener_count(event_types::SCROLL), 0);
        assert_eq!(registry.total_added(), 1);
        assert_eq!(registry.total_removed(), 1);
        assert!(registry.is_empty());
    }
}
