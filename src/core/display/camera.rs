//=========================================================================
// Camera
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::kernel::Kernel;

//=== CameraOptions =======================================================

/// Placement of a new camera. Width/height default to the display size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraOptions {
    pub name: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

//=== Camera ==============================================================

/// Named viewport rectangle that scenes render through.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Camera {
    /// Creates a camera, filling unset fields from the kernel configuration.
    pub fn new(kernel: &Kernel, options: CameraOptions) -> Self {
        let config = kernel.config();
        Self {
            name: options.name.unwrap_or_else(|| config.camera.name.clone()),
            x: options.x,
            y: options.y,
            width: options.width.unwrap_or(config.display.width as f32),
            height: options.height.unwrap_or(config.display.height as f32),
        }
    }

    /// Moves the camera origin.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// True if the world point lies inside the viewport.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}
