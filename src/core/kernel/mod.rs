//=========================================================================
// Kernel
//=========================================================================
//
// Application-wide coordinator.
//
// Responsibilities:
// - Hold the merged application configuration
// - Gate initialization on host readiness (ReadyGate<Environment>)
// - Signal KERNEL_START on the shared event bus
// - Provide diagnostic reporting (error / info)
//
// Lifecycle:
//   new(config) → ready(init) … host: signal_ready(env) → init(env)
//                                                          └─ start()
//
// The kernel is a cheap handle; clones share configuration, readiness
// state and event bus.
//
//=========================================================================

//=== Module Declarations =================================================

mod ready_gate;

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::config::ApplicationConfig;
use crate::core::display::Surface;
use crate::core::event::{EmitReport, EventBus, KERNEL_START};

//=== Public API ==========================================================

pub use ready_gate::ReadyGate;

//=== Environment =========================================================

/// Host resources that exist once the kernel is ready.
#[derive(Clone)]
pub struct Environment {
    surface: Rc<dyn Surface>,
}

impl Environment {
    pub fn new(surface: Rc<dyn Surface>) -> Self {
        Self { surface }
    }

    /// The host drawing surface.
    pub fn surface(&self) -> Rc<dyn Surface> {
        Rc::clone(&self.surface)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("surface_size", &self.surface.size())
            .finish()
    }
}

//=== Kernel ==============================================================

struct KernelState {
    /// Merged and validated; never changes after construction.
    config: ApplicationConfig,

    /// Bus shared with every subsystem of the application.
    events: EventBus,

    /// Opened once by the host with its environment.
    gate: ReadyGate<Environment>,

    /// Number of `start()` calls.
    starts: Cell<u32>,
}

/// Shared coordinator for one application instance.
///
/// # Examples
///
/// ```rust
/// use std::rc::Rc;
/// use thundershock::core::display::HeadlessSurface;
/// use thundershock::prelude::*;
///
/// let kernel = Kernel::new(ApplicationConfig::default());
///
/// kernel.ready(|environment| {
///     println!("host ready: {:?}", environment);
/// });
///
/// kernel.signal_ready(Environment::new(Rc::new(HeadlessSurface::new(800, 600))));
/// assert!(kernel.is_ready());
/// ```
#[derive(Clone)]
pub struct Kernel {
    state: Rc<KernelState>,
}

impl Kernel {
    //--- Construction -----------------------------------------------------

    /// Creates a kernel with its own event bus.
    pub fn new(config: ApplicationConfig) -> Self {
        Self::with_events(config, EventBus::new())
    }

    /// Creates a kernel that signals on an existing bus.
    pub fn with_events(config: ApplicationConfig, events: EventBus) -> Self {
        info!(target: "kernel", "Kernel created for application '{}'", config.name);
        Self {
            state: Rc::new(KernelState {
                config,
                events,
                gate: ReadyGate::new(),
                starts: Cell::new(0),
            }),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn config(&self) -> &ApplicationConfig {
        &self.state.config
    }

    /// The application event bus.
    pub fn events(&self) -> &EventBus {
        &self.state.events
    }

    //--- Readiness --------------------------------------------------------

    /// Runs `callback` once the host environment is available.
    ///
    /// If the kernel is already ready the callback runs immediately.
    pub fn ready<F>(&self, callback: F)
    where
        F: FnOnce(&Environment) + 'static,
    {
        self.state.gate.when_ready(callback);
    }

    /// Marks the host environment as available.
    ///
    /// Called by the platform layer. Queued callbacks run in registration
    /// order. Returns false if the kernel was already ready.
    pub fn signal_ready(&self, environment: Environment) -> bool {
        if self.state.gate.is_ready() {
            Kernel::info("Kernel readiness already signalled, ignoring");
            return false;
        }

        info!(
            target: "kernel",
            "Environment ready, running {} deferred callback(s)",
            self.state.gate.pending()
        );
        self.state.gate.open(environment)
    }

    pub fn is_ready(&self) -> bool {
        self.state.gate.is_ready()
    }

    //--- Start Signal -----------------------------------------------------

    /// Marks the kernel started and emits KERNEL_START.
    ///
    /// Each call emits again; the kernel handle is passed as payload.
    pub fn start(&self) -> EmitReport {
        let starts = self.state.starts.get() + 1;
        self.state.starts.set(starts);

        if starts > 1 {
            Kernel::info(format!("Kernel started again ({} starts)", starts));
        } else {
            Kernel::info("Kernel started");
        }

        self.state.events.emit_with(KERNEL_START, self)
    }

    pub fn is_started(&self) -> bool {
        self.state.starts.get() > 0
    }

    /// Number of times `start()` has been called.
    pub fn start_count(&self) -> u32 {
        self.state.starts.get()
    }

    //--- Diagnostics ------------------------------------------------------

    /// Reports a condition that prevents normal operation. Does not abort.
    pub fn error(message: impl fmt::Display) {
        error!(target: "kernel", "{}", message);
    }

    /// Reports a non-fatal lifecycle notice.
    pub fn info(message: impl fmt::Display) {
        info!(target: "kernel", "{}", message);
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.state.config.name)
            .field("ready", &self.is_ready())
            .field("starts", &self.start_count())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
