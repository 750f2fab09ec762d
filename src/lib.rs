//=========================================================================
// Thundershock Library Root
//
// This crate defines the public API surface of the Thundershock runtime.
//
// Responsibilities:
// - Expose the application entry point (`Thundershock`)
// - Keep the winit host (`platform`) hidden from end users
// - Re-export the event names game code subscribes to
//
// Typical usage:
// ```no_run
// use thundershock::prelude::*;
//
// fn main() -> thundershock::Result<()> {
//     let app = Thundershock::new(Some(InstanceConfig::named("bar")))?;
//     app.run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the kernel, event bus, publisher, display services, scenes
// and timer. `error` holds the crate's error types.
//
pub mod core;
pub mod error;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the winit window host and is not part of the
// public API surface. `engine` defines the bootstrap sequence.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use crate::core::event::{
    KERNEL_START, PUBLISHER_GET, PUBLISHER_SET, SCENE_CHANGE, SERVICE_PRELOAD,
};
pub use engine::{
    Services, Thundershock, ThundershockBuilder, CAMERA_KEY, CANVAS_MANAGER_KEY, RENDER_ENGINE_KEY,
};
pub use error::{Error, Result};
