//=========================================================================
// Publisher
//=========================================================================
//
// Keyed service pool shared across the application.
//
// Architecture:
//   subscribe(key, value) → HashMap<String, Rc<dyn Any>>  (last write wins)
//   get(key)              → Option<Rc<dyn Any>>           (miss = None)
//
// The pool holds shared references only; objects are created and owned
// by whoever constructed them. When bound to an event bus, writes emit
// PUBLISHER_SET and reads emit PUBLISHER_GET with the key as payload.
// Reads and writes made by those listeners do not emit again.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::event::{EventBus, PUBLISHER_GET, PUBLISHER_SET};

//=== Publisher ===========================================================

/// Keyed registry of live service and scene objects.
///
/// Cloning produces another handle onto the same pool.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use thundershock::prelude::*;
///
/// let pool = Publisher::new();
/// let camera = Rc::new(String::from("main camera"));
///
/// pool.subscribe("Camera", camera.clone());
///
/// let found = pool.get_as::<String>("Camera").unwrap();
/// assert!(Rc::ptr_eq(&camera, &found));
/// assert!(pool.get("Missing").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Publisher {
    /// Shared entries; clones of the handle see the same map.
    entries: Rc<RefCell<HashMap<String, Rc<dyn Any>>>>,

    /// Bus for PUBLISHER_SET / PUBLISHER_GET, if bound.
    events: Option<EventBus>,

    /// Set while PUBLISHER_GET listeners run.
    emitting_get: Rc<Cell<bool>>,

    /// Set while PUBLISHER_SET listeners run.
    emitting_set: Rc<Cell<bool>>,
}

impl Publisher {
    /// Creates an empty pool that does not emit events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty pool that reports reads and writes on `events`.
    pub fn with_events(events: EventBus) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    //--- Mutation ---------------------------------------------------------

    /// Inserts or overwrites the entry for `key`.
    pub fn subscribe<T: Any>(&self, key: impl Into<String>, value: Rc<T>) {
        let key = key.into();

        let previous = self.entries.borrow_mut().insert(key.clone(), value);
        if previous.is_some() {
            debug!(target: "publisher", "Entry {} overwritten", key);
        } else {
            trace!(target: "publisher", "Entry {} subscribed", key);
        }

        self.notify(&self.emitting_set, PUBLISHER_SET, &key);
    }

    /// Removes the entry for `key`, returning it if present.
    pub fn unsubscribe(&self, key: &str) -> Option<Rc<dyn Any>> {
        let removed = self.entries.borrow_mut().remove(key);
        if removed.is_some() {
            debug!(target: "publisher", "Entry {} removed", key);
        }
        removed
    }

    //--- Lookup -----------------------------------------------------------

    /// Returns the entry for `key`, or `None` if it was never subscribed.
    pub fn get(&self, key: &str) -> Option<Rc<dyn Any>> {
        let value = self.entries.borrow().get(key).cloned();

        self.notify(&self.emitting_get, PUBLISHER_GET, key);

        value
    }

    /// Returns the entry for `key` downcast to `T`.
    ///
    /// Returns `None` if the key is missing or holds a different type.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<Rc<T>> {
        self.get(key).and_then(|value| value.downcast::<T>().ok())
    }

    //--- Query API --------------------------------------------------------

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Returns all keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns every entry holding a `T`, sorted by key.
    pub fn entries_of<T: Any>(&self) -> Vec<(String, Rc<T>)> {
        let mut found: Vec<(String, Rc<T>)> = self
            .entries
            .borrow()
            .iter()
            .filter_map(|(key, value)| {
                value
                    .clone()
                    .downcast::<T>()
                    .ok()
                    .map(|typed| (key.clone(), typed))
            })
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Publisher {
    /// Emits `name` unless its listeners are already running.
    fn notify(&self, guard: &Cell<bool>, name: &str, key: &str) {
        let Some(events) = &self.events else {
            return;
        };
        if guard.replace(true) {
            trace!(target: "publisher", "Nested {} for {} suppressed", name, key);
            return;
        }

        events.emit_with(name, &key.to_string());
        guard.set(false);
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("keys", &self.keys())
            .field("emits_events", &self.events.is_some())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
