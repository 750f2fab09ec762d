//=========================================================================
// Platform Subsystem
//
// Hosts the application inside a winit window.
//
// Architecture:
// ```text
//  Main Thread
//  ┌──────────────────────────────────────────────┐
//  │  Winit Event Loop                            │
//  │   ├─ resumed()                               │
//  │   │    ├─ create window (config title/size)  │
//  │   │    └─ kernel.signal_ready(Environment)   │──> deferred init
//  │   │                                          │    KERNEL_START
//  │   └─ RedrawRequested                         │
//  │        ├─ timer.advance(now)                 │──> fixed steps
//  │        └─ request next redraw                │
//  └──────────────────────────────────────────────┘
//
//  Frame Boundary: RedrawRequested
//    → Timer runs the steps due since the last redraw
//    → Logic rate independent of refresh rate
// ```
//
// Notes:
// - The window is created lazily in `resumed()` (mobile compatibility).
// - Winit mandates the main thread on macOS/iOS, so this runs on the
//   thread that called `Thundershock::run()`.
// - A window creation failure is kept and returned from `run()` once the
//   loop exits.
//
//=========================================================================

//=== External Crates =====================================================

use std::rc::Rc;
use std::time::Instant;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::display::Surface;
use crate::core::{Environment, Kernel, Timer};
use crate::error::PlatformError;

//=== Window Surface ======================================================

impl Surface for Window {
    fn size(&self) -> (u32, u32) {
        let size = self.inner_size();
        (size.width, size.height)
    }

    fn resize(&self, width: u32, height: u32) {
        let requested = PhysicalSize::new(width.max(1), height.max(1));
        if self.request_inner_size(requested).is_none() {
            trace!(target: "platform", "Resize to {}x{} requested asynchronously", width, height);
        }
    }

    fn request_redraw(&self) {
        Window::request_redraw(self);
    }
}

//=== Platform ============================================================

/// Window host driving the kernel and the timer.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(kernel, timer)`
/// 2. **Execution**: `platform.run()` blocks on the event loop
/// 3. **Readiness**: first `resumed()` creates the window and signals
///    the kernel
/// 4. **Shutdown**: window close exits the loop and `run()` returns
///
/// # Thread Safety
///
/// This type is NOT Send/Sync - it must remain on the main thread.
pub(crate) struct Platform {
    kernel: Kernel,
    timer: Timer,

    /// OS window handle (None until `resumed()` called).
    window: Option<Rc<Window>>,

    /// First fatal error seen inside the event loop.
    error: Option<PlatformError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub fn new(kernel: Kernel, timer: Timer) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            kernel,
            timer,
            window: None,
            error: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window is closed.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails, or if the window could not be created.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn window_attributes(&self) -> WindowAttributes {
        let display = &self.kernel.config().display;
        WindowAttributes::default()
            .with_title(display.title.clone())
            .with_inner_size(LogicalSize::new(display.width, display.height))
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Rc<Window>> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        match event_loop.create_window(self.window_attributes()) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );

                let window = Rc::new(window);
                self.window = Some(window.clone());

                self.kernel.signal_ready(Environment::new(window.clone()));
                window.request_redraw();
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.error = Some(PlatformError::WindowCreation(e.to_string()));
                event_loop.exit();
            }
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.timer.stop();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                trace!(target: "platform", "Window resized to {}x{}", size.width, size.height);
            }

            WindowEvent::RedrawRequested => {
                let steps = self.timer.advance(Instant::now());
                if steps > 1 {
                    trace!(target: "platform", "{} steps run this frame", steps);
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ApplicationConfig, TimerOptions};

    fn platform(config: ApplicationConfig) -> Platform {
        let kernel = Kernel::new(config);
        let timer = Timer::new(&kernel, TimerOptions::default());
        Platform::new(kernel, timer)
    }

    #[test]
    fn platform_creation() {
        let platform = platform(ApplicationConfig::default());
        assert!(platform.window().is_none(), "Window should be created lazily");
        assert!(platform.error.is_none());
        assert!(!platform.kernel.is_ready(), "Readiness waits for the window");
    }

    #[test]
    fn window_is_a_surface() {
        fn assert_surface<T: Surface + 'static>() {}
        assert_surface::<Window>();
    }

    #[test]
    fn window_creation_error_display_format() {
        let err = PlatformError::WindowCreation("no display".into());
        assert_eq!(err.to_string(), "window creation failed: no display");
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
