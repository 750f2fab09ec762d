//=========================================================================
// Surface
//=========================================================================
//
// Host drawing surface abstraction.
//
// The desktop platform implements it for the winit window; the headless
// implementation records requests so tools and tests can run without a
// display server.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;

//=== Surface Trait =======================================================

/// A host-provided surface the canvas manager draws into.
pub trait Surface {
    /// Current size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Asks the host to resize the surface.
    fn resize(&self, width: u32, height: u32);

    /// Asks the host to present a new frame.
    fn request_redraw(&self);
}

//=== HeadlessSurface =====================================================

/// In-memory surface used when no window is available.
#[derive(Debug)]
pub struct HeadlessSurface {
    size: Cell<(u32, u32)>,
    redraws: Cell<u64>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new((width, height)),
            redraws: Cell::new(0),
        }
    }

    /// Number of redraws requested so far.
    pub fn redraw_requests(&self) -> u64 {
        self.redraws.get()
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    fn resize(&self, width: u32, height: u32) {
        self.size.set((width.max(1), height.max(1)));
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}
