//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use thundershock::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Application entry
pub use crate::engine::{Thundershock, ThundershockBuilder};

// Configuration
pub use crate::core::config::{ApplicationConfig, InstanceConfig};

// Kernel and events
pub use crate::core::event::{
    EventBus, HandlerResult, KERNEL_START, PUBLISHER_GET, PUBLISHER_SET, SCENE_CHANGE,
    SERVICE_PRELOAD,
};
pub use crate::core::kernel::{Environment, Kernel};

// Service pool
pub use crate::core::publisher::Publisher;

// Scene system
pub use crate::core::scene::{
    Preload, PreloadStatus, Scene, SceneContext, SceneHooks, SceneProps, SceneState,
};

// Display and timing
pub use crate::core::display::{Camera, CameraOptions};
pub use crate::core::timer::Frame;

// Errors
pub use crate::error::{HandlerError, ObjectError};
