//=========================================================================
// Display
//=========================================================================
//
// Display services created during bootstrap and stored in the publisher.
//
// Architecture:
//   Surface (host window / headless)
//     └─ CanvasManager ──use_context()──> RenderContext
//                                              └─ RenderEngine
//   Camera (viewport rectangle, named)
//
//=========================================================================

//=== Module Declarations =================================================

mod camera;
mod canvas_manager;
mod render_engine;
mod surface;

//=== Public API ==========================================================

pub use camera::{Camera, CameraOptions};
pub use canvas_manager::{CanvasManager, RenderContext};
pub use render_engine::{RenderEngine, RenderOptions};
pub use surface::{HeadlessSurface, Surface};
