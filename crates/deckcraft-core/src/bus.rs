//! Event bus.
//!
//! A registry mapping `(EventKind, HandlerId)` to callbacks. The bus is an
//! explicitly constructed handle: clones share one registry, and separate
//! editors (or tests) own separate buses.

use crate::events::{DeckEvent, EventKind};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Callback invoked on dispatch.
pub type Handler = Rc<dyn Fn(&DeckEvent)>;

/// Name under which a handler is registered for one event kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(Cow<'static, str>);

impl HandlerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for HandlerId {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for HandlerId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a `listen` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// An existing handler under the same key was replaced.
    Overshadowed,
}

struct Entry {
    id: HandlerId,
    handler: Handler,
    once: bool,
}

#[derive(Default)]
struct Registry {
    /// Handlers per kind, in registration order. Kinds with no handlers
    /// are removed.
    kinds: HashMap<EventKind, Vec<Rc<Entry>>>,
}

/// Shared handle to an event registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Registry>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("kinds", &registry.kinds.len())
            .field(
                "handlers",
                &registry.kinds.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind` under `id`.
    ///
    /// Re-registering an occupied key replaces the previous handler in
    /// its dispatch position and logs a warning.
    pub fn listen<F>(&self, kind: EventKind, id: impl Into<HandlerId>, handler: F) -> Registration
    where
        F: Fn(&DeckEvent) + 'static,
    {
        self.register(kind, id.into(), Rc::new(handler), false)
    }

    /// Like [`listen`](Self::listen), but the handler removes itself before
    /// its first invocation.
    pub fn listen_once<F>(
        &self,
        kind: EventKind,
        id: impl Into<HandlerId>,
        handler: F,
    ) -> Registration
    where
        F: Fn(&DeckEvent) + 'static,
    {
        self.register(kind, id.into(), Rc::new(handler), true)
    }

    fn register(&self, kind: EventKind, id: HandlerId, handler: Handler, once: bool) -> Registration {
        let mut registry = self.inner.borrow_mut();
        let entries = registry.kinds.entry(kind).or_default();
        let position = entries.iter().position(|e| e.id == id);
        let entry = Rc::new(Entry { id, handler, once });
        match position {
            Some(index) => {
                log::warn!("Handler '{}' on {kind} overshadowed by a new registration", entry.id);
                entries[index] = entry;
                Registration::Overshadowed
            }
            None => {
                entries.push(entry);
                Registration::Added
            }
        }
    }

    /// Remove the handler registered for `kind` under `id`.
    ///
    /// Returns false (and logs a warning) if there was none.
    pub fn unlisten(&self, kind: EventKind, id: &HandlerId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let Some(entries) = registry.kinds.get_mut(&kind) else {
            log::warn!("Cannot unlisten '{id}' from {kind}: no handlers registered");
            return false;
        };
        let Some(index) = entries.iter().position(|e| &e.id == id) else {
            log::warn!("Cannot unlisten '{id}' from {kind}: not registered");
            return false;
        };
        entries.remove(index);
        if entries.is_empty() {
            registry.kinds.remove(&kind);
        }
        true
    }

    /// Invoke every handler registered for `kind`, in registration order.
    ///
    /// Handlers added during the dispatch are not invoked by it; handlers
    /// removed during the dispatch are skipped. Returns the number of
    /// handlers invoked.
    pub fn dispatch(&self, kind: EventKind, event: &DeckEvent) -> usize {
        let Some(snapshot) = self.inner.borrow().kinds.get(&kind).cloned() else {
            return 0;
        };
        let mut invoked = 0;
        for entry in snapshot {
            if !self.is_current(kind, &entry) {
                continue;
            }
            if entry.once {
                self.remove_entry(kind, &entry);
            }
            (entry.handler)(event);
            invoked += 1;
        }
        invoked
    }

    fn is_current(&self, kind: EventKind, entry: &Rc<Entry>) -> bool {
        self.inner
            .borrow()
            .kinds
            .get(&kind)
            .is_some_and(|entries| entries.iter().any(|e| Rc::ptr_eq(e, entry)))
    }

    fn remove_entry(&self, kind: EventKind, entry: &Rc<Entry>) {
        let mut registry = self.inner.borrow_mut();
        if let Some(entries) = registry.kinds.get_mut(&kind) {
            entries.retain(|e| !Rc::ptr_eq(e, entry));
            if entries.is_empty() {
                registry.kinds.remove(&kind);
            }
        }
    }

    /// Number of handlers registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.inner.borrow().kinds.get(&kind).map_or(0, Vec::len)
    }

    /// Number of kinds with at least one handler.
    pub fn kind_count(&self) -> usize {
        self.inner.borrow().kinds.len()
    }

    pub fn is_listening(&self, kind: EventKind, id: &HandlerId) -> bool {
        self.inner
            .borrow()
            .kinds
            .get(&kind)
            .is_some_and(|entries| entries.iter().any(|e| &e.id == id))
    }

    /// Every live registration.
    pub fn registrations(&self) -> Vec<(EventKind, HandlerId)> {
        self.inner
            .borrow()
            .kinds
            .iter()
            .flat_map(|(kind, entries)| entries.iter().map(|e| (*kind, e.id.clone())))
            .collect()
    }
}

/// A revocable set of registrations on one bus.
///
/// Tools own one for their mount set and one for in-flight gestures, so
/// that every listener they add can be removed through a single handle.
pub struct Subscriptions {
    bus: EventBus,
    keys: RefCell<Vec<(EventKind, HandlerId)>>,
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("keys", &self.keys.borrow().len())
            .finish()
    }
}

impl Subscriptions {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            keys: RefCell::new(Vec::new()),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn track(&self, kind: EventKind, id: &HandlerId) {
        let mut keys = self.keys.borrow_mut();
        if !keys.iter().any(|(k, i)| *k == kind && i == id) {
            keys.push((kind, id.clone()));
        }
    }

    pub fn listen<F>(&self, kind: EventKind, id: impl Into<HandlerId>, handler: F) -> Registration
    where
        F: Fn(&DeckEvent) + 'static,
    {
        let id = id.into();
        self.track(kind, &id);
        self.bus.listen(kind, id, handler)
    }

    pub fn listen_once<F>(
        &self,
        kind: EventKind,
        id: impl Into<HandlerId>,
        handler: F,
    ) -> Registration
    where
        F: Fn(&DeckEvent) + 'static,
    {
        let id = id.into();
        self.track(kind, &id);
        self.bus.listen_once(kind, id, handler)
    }

    /// Remove one tracked registration. Already-fired once handlers are
    /// forgotten without a warning.
    pub fn revoke(&self, kind: EventKind, id: &HandlerId) -> bool {
        let tracked = {
            let mut keys = self.keys.borrow_mut();
            let before = keys.len();
            keys.retain(|(k, i)| !(*k == kind && i == id));
            keys.len() != before
        };
        tracked && self.bus.is_listening(kind, id) && self.bus.unlisten(kind, id)
    }

    /// Remove every tracked registration still on the bus. Returns how many
    /// were removed.
    pub fn revoke_all(&self) -> usize {
        let keys = std::mem::take(&mut *self.keys.borrow_mut());
        keys.into_iter()
            .filter(|(kind, id)| self.bus.is_listening(*kind, id) && self.bus.unlisten(*kind, id))
            .count()
    }

    /// Number of tracked registrations still on the bus.
    pub fn len(&self) -> usize {
        self.keys
            .borrow()
            .iter()
            .filter(|(kind, id)| self.bus.is_listening(*kind, id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.revoke_all();
    }
}
