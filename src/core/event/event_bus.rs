//=========================================================================
// Event Bus
//=========================================================================
//
// Named-channel publish/subscribe dispatcher shared by one application.
//
// Architecture:
//   on(name, handler) → HashMap<String, Vec<(ListenerId, Listener)>>
//                              ↓
//   emit(name, payload) → snapshot listeners → invoke in order
//                              ↓
//   failures (Err / panic) logged per listener, delivery continues
//
// The bus is a cheap handle: clones share the same registry. One bus is
// created per application and passed explicitly to whoever needs it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{error, trace};

//=== Internal Dependencies ===============================================

use crate::error::HandlerError;

//=== Public API ==========================================================

/// Result returned by every listener.
pub type HandlerResult = Result<(), HandlerError>;

/// Identifies a registered listener for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Outcome of a single emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Listeners that returned `Ok`.
    pub delivered: usize,

    /// Listeners that returned `Err` or panicked.
    pub failed: usize,
}

impl EmitReport {
    /// Total number of listeners invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }

    /// True if no listener failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

//=========================================================================

type Listener = Rc<dyn Fn(&dyn Any) -> HandlerResult>;

#[derive(Default)]
struct Registry {
    /// Listeners per event name, in registration order.
    channels: HashMap<String, Vec<(ListenerId, Listener)>>,

    /// Next id handed out by `on`; ids are never reused.
    next_id: u64,
}

/// Named-channel event dispatcher.
///
/// Listeners for a name are invoked synchronously in registration order.
/// Emitting a name without listeners is a no-op.
///
/// # Examples
///
/// ```rust
/// use thundershock::prelude::*;
///
/// let bus = EventBus::new();
/// bus.on(SCENE_CHANGE, |payload| {
///     if let Some(id) = payload.downcast_ref::<String>() {
///         println!("now showing {id}");
///     }
///     Ok(())
/// });
///
/// let report = bus.emit_with(SCENE_CHANGE, &"scene1".to_string());
/// assert_eq!(report.delivered, 1);
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl EventBus {
    /// Creates a new bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers `handler` to run whenever `name` is emitted.
    ///
    /// The handler receives the emission payload as `&dyn Any`; use
    /// `downcast_ref` to read it.
    pub fn on<F>(&self, name: impl Into<String>, handler: F) -> ListenerId
    where
        F: Fn(&dyn Any) -> HandlerResult + 'static,
    {
        let name = name.into();
        let mut registry = self.registry.borrow_mut();

        let id = ListenerId(registry.next_id);
        registry.next_id += 1;

        trace!(target: "event_bus", "Listener {:?} registered on {}", id, name);
        registry
            .channels
            .entry(name)
            .or_default()
            .push((id, Rc::new(handler)));

        id
    }

    /// Removes a listener. Returns false if the id is unknown.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();

        for listeners in registry.channels.values_mut() {
            if let Some(pos) = listeners.iter().position(|(lid, _)| *lid == id) {
                listeners.remove(pos);
                return true;
            }
        }

        false
    }

    //--- Dispatch ---------------------------------------------------------

    /// Emits `name` with an empty payload.
    pub fn emit(&self, name: &str) -> EmitReport {
        self.emit_with(name, &())
    }

    /// Emits `name`, passing `payload` to every listener.
    ///
    /// Listeners registered or removed while the emission runs do not
    /// affect it. A listener that fails is logged and skipped.
    pub fn emit_with(&self, name: &str, payload: &dyn Any) -> EmitReport {
        // Snapshot so listeners may touch the bus re-entrantly.
        let snapshot = self.registry.borrow().channels.get(name).cloned();
        let listeners: Vec<(ListenerId, Listener)> = match snapshot {
            Some(listeners) => listeners,
            None => return EmitReport::default(),
        };

        trace!(target: "event_bus", "Emitting {} to {} listener(s)", name, listeners.len());

        let mut report = EmitReport::default();
        for (id, listener) in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    error!(target: "event_bus", "Listener {:?} on {} failed: {}", id, name, err);
                    report.failed += 1;
                }
                Err(panic) => {
                    error!(
                        target: "event_bus",
                        "Listener {:?} on {} panicked: {}",
                        id,
                        name,
                        panic_message(panic.as_ref())
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    //--- Query API --------------------------------------------------------

    /// Number of listeners registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry
            .borrow()
            .channels
            .get(name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// True if both handles share the same registry.
    pub fn same_bus(&self, other: &EventBus) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EventBus")
            .field("channels", &registry.channels.len())
            .finish()
    }
}

/// Readable text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else {
        "unknown panic"
    }
}

//=========================================================================
// Tests
//=========================================================================
