//=========================================================================
// Core Systems
//
// Building blocks wired together by the `Thundershock` application entry.
//
// Layering (leaves first):
// - `event`:     event names and the application event bus
// - `config`:    defaults, overrides and validation
// - `kernel`:    configuration holder, readiness gate, start signal
// - `publisher`: keyed service pool
// - `display`:   surface, camera, canvas manager, render engine
// - `scene`:     scene lifecycle and preload tasks
// - `factory`:   named constructors for `Thundershock::add`
// - `timer`:     fixed-step tick driver
//
// Notes:
// Everything here is single-threaded. Shared handles use `Rc<RefCell<_>>`
// and release their borrows before calling back into user code, so
// listeners and continuations may re-enter the same subsystem.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod config;
pub mod display;
pub mod event;
pub mod factory;
pub mod kernel;
pub mod publisher;
pub mod scene;
pub mod timer;

//=== Public API ==========================================================

pub use config::{define_configuration, ApplicationConfig, InstanceConfig};
pub use event::EventBus;
pub use factory::ObjectFactory;
pub use kernel::{Environment, Kernel};
pub use publisher::Publisher;
pub use scene::{Scene, SceneHooks, SceneProps};
pub use timer::{Frame, Timer, TimerOptions};
