//=========================================================================
// Canvas Manager
//=========================================================================
//
// Owns the drawing context over the host surface.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use super::Surface;
use crate::core::kernel::{Environment, Kernel};

//=== RenderContext =======================================================

struct ContextState {
    surface: Rc<dyn Surface>,
    size: Cell<(u32, u32)>,
}

/// Shared handle to the drawing context of a canvas.
///
/// Clones refer to the same context.
#[derive(Clone)]
pub struct RenderContext {
    state: Rc<ContextState>,
}

impl RenderContext {
    /// Logical size of the context.
    pub fn size(&self) -> (u32, u32) {
        self.state.size.get()
    }

    pub fn width(&self) -> u32 {
        self.size().0
    }

    pub fn height(&self) -> u32 {
        self.size().1
    }

    /// Asks the host to present the context.
    pub fn present(&self) {
        self.state.surface.request_redraw();
    }

    /// True if both handles point at the same context.
    pub fn same_context(&self, other: &RenderContext) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("size", &self.size())
            .finish()
    }
}

//=== CanvasManager =======================================================

/// Manages the canvas provided by the host environment.
#[derive(Debug)]
pub struct CanvasManager {
    context: RenderContext,
}

impl CanvasManager {
    /// Wraps the surface of a ready environment.
    pub fn new(_kernel: &Kernel, environment: &Environment) -> Self {
        let surface = environment.surface();
        let size = surface.size();

        debug!(target: "display", "Canvas attached ({}x{})", size.0, size.1);

        Self {
            context: RenderContext {
                state: Rc::new(ContextState {
                    surface,
                    size: Cell::new(size),
                }),
            },
        }
    }

    /// Returns the drawing context.
    pub fn use_context(&self) -> RenderContext {
        self.context.clone()
    }

    /// Resizes the context and the underlying surface.
    pub fn resize_context(&self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);

        debug!(target: "display", "Resizing canvas context to {}x{}", width, height);
        self.context.state.size.set((width, height));
        self.context.state.surface.resize(width, height);
    }
}
