//=========================================================================
// Render Engine
//=========================================================================
//
// Root entry for presenting frames produced by the timer.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;

use log::trace;

//=== Internal Dependencies ===============================================

use super::RenderContext;
use crate::core::kernel::Kernel;
use crate::core::timer::Frame;

//=== RenderOptions =======================================================

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Context frames are presented into.
    pub target: RenderContext,
}

//=== RenderEngine ========================================================

/// Presents one frame per timer tick into its target context.
#[derive(Debug)]
pub struct RenderEngine {
    target: RenderContext,
    frames: Cell<u64>,
    last_frame: Cell<Option<u64>>,
}

impl RenderEngine {
    pub fn new(_kernel: &Kernel, options: RenderOptions) -> Self {
        Self {
            target: options.target,
            frames: Cell::new(0),
            last_frame: Cell::new(None),
        }
    }

    /// Presents `frame`.
    pub fn render(&self, frame: &Frame) {
        trace!(target: "display", "Rendering frame {}", frame.index);
        self.frames.set(self.frames.get() + 1);
        self.last_frame.set(Some(frame.index));
        self.target.present();
    }

    /// The context this engine presents into.
    pub fn target(&self) -> &RenderContext {
        &self.target
    }

    /// Number of frames rendered.
    pub fn frames_rendered(&self) -> u64 {
        self.frames.get()
    }

    /// Index of the last rendered frame.
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame.get()
    }
}
