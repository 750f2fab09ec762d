//=========================================================================
// Event System
//=========================================================================
//
// Application-wide signalling between the kernel lifecycle and user code.
//
// Components:
// - `names`: built-in event name constants
// - `event_bus`: named-channel publish/subscribe dispatcher
//
//=========================================================================

//=== Module Declarations =================================================

mod event_bus;
pub mod names;

//=== Public API ==========================================================

pub use event_bus::{EmitReport, EventBus, HandlerResult, ListenerId};
pub(crate) use event_bus::panic_message;
pub use names::{KERNEL_START, PUBLISHER_GET, PUBLISHER_SET, SCENE_CHANGE, SERVICE_PRELOAD};
