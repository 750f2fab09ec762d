//=========================================================================
// Thundershock
//
// Application entry point and bootstrap sequencer.
//
// Architecture:
// ```text
//     ThundershockBuilder ──build()──> Thundershock ──run()──> [winit host]
//         │                               │        └─run_headless(n)
//         ├─ with_name() / with_display() ├─ kernel()   events, readiness
//         ├─ with_tps()                   ├─ pool()     service pool
//         └─ with_config_file()           └─ add() / add_scene()
// ```
//
// Bootstrap order (order-dependent, do not reshuffle):
//   1. merge + validate configuration
//   2. Kernel
//   3. Timer (autostart)
//   4. Publisher
//   5. kernel.ready(init)
//   ── host signals readiness ──
//   6. Camera, CanvasManager, RenderEngine
//   7. subscribe "Camera", "CanvasManager", "RenderEngine"
//   8. resize canvas context to the display size
//   9. kernel.start() → KERNEL_START
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use crossbeam_channel::tick;
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::display::{
    Camera, CameraOptions, CanvasManager, HeadlessSurface, RenderEngine, RenderOptions,
};
use crate::core::event::{EventBus, SERVICE_PRELOAD};
use crate::core::{
    define_configuration, ApplicationConfig, Environment, InstanceConfig, Kernel, ObjectFactory,
    Publisher, Scene, SceneProps, Timer, TimerOptions,
};
use crate::error::{ObjectError, Result};
use crate::platform::Platform;

//=== Well-known publisher keys ===========================================

pub const CAMERA_KEY: &str = "Camera";
pub const CANVAS_MANAGER_KEY: &str = "CanvasManager";
pub const RENDER_ENGINE_KEY: &str = "RenderEngine";

//=== ThundershockBuilder =================================================

/// Fluent construction of a [`Thundershock`] application.
///
/// Every setting is optional; unset values fall back to the configuration
/// file (if any) and then to the defaults. Builder settings win over file
/// values. Validation happens once, in [`build`](Self::build).
///
/// # Examples
///
/// ```no_run
/// use thundershock::ThundershockBuilder;
///
/// let app = ThundershockBuilder::new()
///     .with_name("bar")
///     .with_display(1280, 720)
///     .with_tps(120.0)
///     .build()
///     .expect("valid configuration");
///
/// app.run().expect("platform available");
/// ```
///
/// Reading a file and overriding one value:
///
/// ```no_run
/// use thundershock::ThundershockBuilder;
///
/// let app = ThundershockBuilder::new()
///     .with_config_file("thundershock.toml")
///     .with_title("Debug build")
///     .build()?;
/// # Ok::<(), thundershock::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ThundershockBuilder {
    /// Values set through the `with_*` methods.
    overrides: InstanceConfig,

    /// TOML file read by `build()`, underneath `overrides`.
    config_file: Option<PathBuf>,
}

impl ThundershockBuilder {
    //--- Construction -----------------------------------------------------

    /// Creates a builder with nothing overridden.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Settings ---------------------------------------------------------

    /// Sets the application name. Must not be blank.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.overrides.name = Some(name.into());
        self
    }

    /// Sets the display size in pixels. Both sides must be non-zero.
    pub fn with_display(mut self, width: u32, height: u32) -> Self {
        self.overrides.display.width = Some(width);
        self.overrides.display.height = Some(height);
        self
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.overrides.display.title = Some(title.into());
        self
    }

    /// Sets the fixed logic rate in ticks per second.
    ///
    /// The rate must give a non-zero step that fits in a `Duration`;
    /// anything else fails in `build()` with `InvalidTickRate`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        self.overrides.timer.tps = Some(tps);
        self
    }

    /// Sets whether the timer starts with the kernel (default: true).
    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.overrides.timer.autostart = Some(autostart);
        self
    }

    /// Reads base overrides from a TOML file when building.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    //--- Build ------------------------------------------------------------

    /// Builds the application.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the file cannot be read or the
    /// merged configuration is invalid.
    pub fn build(self) -> Result<Thundershock> {
        let overrides = match self.config_file {
            Some(path) => merge_overrides(InstanceConfig::load(path)?, self.overrides),
            None => self.overrides,
        };
        Thundershock::new(Some(overrides))
    }
}

/// Values set in `top` win over `base`.
fn merge_overrides(base: InstanceConfig, top: InstanceConfig) -> InstanceConfig {
    InstanceConfig {
        name: top.name.or(base.name),
        display: crate::core::config::DisplayOverrides {
            width: top.display.width.or(base.display.width),
            height: top.display.height.or(base.display.height),
            title: top.display.title.or(base.display.title),
        },
        timer: crate::core::config::TimerOverrides {
            tps: top.timer.tps.or(base.timer.tps),
            autostart: top.timer.autostart.or(base.timer.autostart),
            max_steps_per_frame: top
                .timer
                .max_steps_per_frame
                .or(base.timer.max_steps_per_frame),
        },
        camera: crate::core::config::CameraOverrides {
            name: top.camera.name.or(base.camera.name),
        },
    }
}

//=== Services ============================================================

/// Display services created once the kernel is ready.
#[derive(Debug, Clone)]
pub struct Services {
    /// Main camera covering the whole display. Pooled as `"Camera"`.
    pub camera: Rc<RefCell<Camera>>,

    /// Canvas over the host surface. Pooled as `"CanvasManager"`.
    pub canvas_manager: Rc<CanvasManager>,

    /// Presents one frame per timer step. Pooled as `"RenderEngine"`.
    pub render_engine: Rc<RenderEngine>,
}

//=== Thundershock ========================================================

/// A running Thundershock application.
///
/// Clones are handles onto the same application, which lets game code
/// capture the application inside event listeners.
///
/// # Lifecycle
///
/// 1. **Construction**: `Thundershock::new(config)` or the builder
/// 2. **Readiness**: `run()` / `run_headless()` hand the kernel a surface;
///    display services are created and pooled
/// 3. **Start**: `KERNEL_START` fires; listeners add and start scenes
/// 4. **Frames**: each timer step updates scenes, then renders
///
/// # Examples
///
/// ```rust
/// use thundershock::prelude::*;
///
/// let app = Thundershock::new(Some(InstanceConfig::named("bar"))).unwrap();
///
/// let game = app.clone();
/// app.events().on(KERNEL_START, move |_| {
///     let scene = game.add_scene(SceneProps::new("scene1"))?;
///     scene.borrow_mut().start();
///     Ok(())
/// });
///
/// app.run_headless(1);
/// assert!(app.pool().contains("scene1"));
/// ```
#[derive(Clone)]
pub struct Thundershock {
    /// Configuration, readiness and the event bus.
    kernel: Kernel,

    /// Fixed-step driver; started by KERNEL_START when autostart is on.
    timer: Timer,

    /// Service pool; reports reads and writes on the kernel's bus.
    pool: Publisher,

    /// Constructors reachable through `add`.
    objects: ObjectFactory,

    /// Filled by `init` once the host is ready.
    services: Rc<RefCell<Option<Services>>>,
}

impl Thundershock {
    //--- Construction -----------------------------------------------------

    /// Creates the application and defers display setup until the kernel
    /// reports the host environment ready.
    pub fn new(config: Option<InstanceConfig>) -> Result<Self> {
        let config = define_configuration(config)?;
        info!(target: "thundershock", "Bootstrapping application '{}'", config.name);

        let kernel = Kernel::new(config);

        let timer = Timer::new(&kernel, TimerOptions::from(&kernel.config().timer));

        let pool = Publisher::with_events(kernel.events().clone());

        let app = Self {
            kernel,
            timer,
            pool,
            objects: ObjectFactory::with_defaults(),
            services: Rc::new(RefCell::new(None)),
        };

        app.timer.on_tick({
            let app = app.clone();
            move |frame| {
                app.update_scenes();
                if let Some(services) = app.services() {
                    services.render_engine.render(frame);
                }
            }
        });

        app.kernel.ready({
            let app = app.clone();
            move |environment| app.init(environment)
        });

        Ok(app)
    }

    /// Runs once the host environment is ready.
    fn init(&self, environment: &Environment) {
        let config = self.kernel.config();
        let (width, height) = (config.display.width, config.display.height);
        let events = self.kernel.events();

        let camera = Rc::new(RefCell::new(Camera::new(
            &self.kernel,
            CameraOptions {
                name: None,
                x: 0.0,
                y: 0.0,
                width: Some(width as f32),
                height: Some(height as f32),
            },
        )));
        events.emit_with(SERVICE_PRELOAD, &CAMERA_KEY.to_string());

        let canvas_manager = Rc::new(CanvasManager::new(&self.kernel, environment));
        events.emit_with(SERVICE_PRELOAD, &CANVAS_MANAGER_KEY.to_string());

        let render_engine = Rc::new(RenderEngine::new(
            &self.kernel,
            RenderOptions {
                target: canvas_manager.use_context(),
            },
        ));
        events.emit_with(SERVICE_PRELOAD, &RENDER_ENGINE_KEY.to_string());

        self.pool.subscribe(CAMERA_KEY, camera.clone());
        self.pool.subscribe(CANVAS_MANAGER_KEY, canvas_manager.clone());
        self.pool.subscribe(RENDER_ENGINE_KEY, render_engine.clone());

        canvas_manager.resize_context(width, height);

        *self.services.borrow_mut() = Some(Services {
            camera,
            canvas_manager,
            render_engine,
        });

        debug!(target: "thundershock", "Display services registered, starting kernel");
        self.kernel.start();
    }

    //--- Objects ----------------------------------------------------------

    /// Creates a `kind` object through the object factory.
    ///
    /// # Errors
    ///
    /// Unknown kinds and payload/output type mismatches are reported
    /// through `Kernel::error` and returned; nothing is constructed.
    pub fn add<T, P>(&self, kind: &str, payload: P) -> Result<Rc<RefCell<T>>, ObjectError>
    where
        T: Any,
        P: Any,
    {
        match self.objects.create::<T, P>(&self.kernel, kind, payload) {
            Ok(object) => {
                Kernel::info(format!("Object created: {kind}"));
                Ok(object)
            }
            Err(err) => {
                Kernel::error(&err);
                Err(err)
            }
        }
    }

    /// Creates a scene and subscribes it to the pool under its id.
    pub fn add_scene(&self, props: SceneProps) -> Result<Rc<RefCell<Scene>>, ObjectError> {
        let scene = self.add::<Scene, _>("Scene", props)?;
        let id = scene.borrow().id().to_string();
        self.pool.subscribe(id, scene.clone());
        Ok(scene)
    }

    //--- Frame Loop -------------------------------------------------------

    /// Runs the timer steps due at `now`. Returns the number of steps run.
    pub fn tick(&self, now: Instant) -> usize {
        self.timer.advance(now)
    }

    /// Runs a single timer step regardless of elapsed time.
    pub fn step(&self) -> bool {
        self.timer.step()
    }

    fn update_scenes(&self) {
        for (key, scene) in self.pool.entries_of::<RefCell<Scene>>() {
            // A scene hook that drives the timer itself is already borrowed.
            match scene.try_borrow_mut() {
                Ok(mut scene) => {
                    scene.update();
                }
                Err(_) => debug!(target: "thundershock", "Scene {} busy, skipping update", key),
            }
        }
    }

    //--- Execution --------------------------------------------------------

    /// Opens a window and runs until it is closed.
    ///
    /// # Errors
    ///
    /// Returns a platform error if the event loop or window cannot be
    /// created.
    pub fn run(&self) -> Result<()> {
        info!(target: "thundershock", "Starting desktop runtime");
        Platform::new(self.kernel.clone(), self.timer.clone()).run()?;
        info!(target: "thundershock", "Desktop runtime finished");
        Ok(())
    }

    /// Runs `frames` timer steps against an in-memory surface, paced at the
    /// configured rate. Returns the number of steps run.
    pub fn run_headless(&self, frames: u64) -> u64 {
        let config = self.kernel.config();
        let surface = Rc::new(HeadlessSurface::new(config.display.width, config.display.height));

        if !self.kernel.signal_ready(Environment::new(surface)) {
            debug!(target: "thundershock", "Kernel already ready, reusing its environment");
        }

        let ticker = tick(self.timer.step_duration());
        let mut ran = 0;
        for _ in 0..frames {
            if ticker.recv().is_err() || !self.timer.step() {
                break;
            }
            ran += 1;
        }

        info!(target: "thundershock", "Headless run finished after {} frame(s)", ran);
        ran
    }

    //--- Accessors --------------------------------------------------------

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn config(&self) -> &ApplicationConfig {
        self.kernel.config()
    }

    /// Shortcut for `kernel().events()`.
    pub fn events(&self) -> &EventBus {
        self.kernel.events()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// The service pool.
    pub fn pool(&self) -> &Publisher {
        &self.pool
    }

    pub fn objects(&self) -> &ObjectFactory {
        &self.objects
    }

    /// Display services, once the kernel is ready.
    pub fn services(&self) -> Option<Services> {
        self.services.borrow().clone()
    }
}

impl std::fmt::Debug for Thundershock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thundershock")
            .field("kernel", &self.kernel)
            .field("timer", &self.timer)
            .field("pool", &self.pool)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::core::display::Surface;
    use crate::core::event::KERNEL_START;
    use crate::error::{ConfigError, Error};

    fn headless_environment() -> (Rc<HeadlessSurface>, Environment) {
        let surface = Rc::new(HeadlessSurface::new(1, 1));
        (surface.clone(), Environment::new(surface))
    }

    //=====================================================================
    // Builder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let app = ThundershockBuilder::new().build().unwrap();
        assert_eq!(app.config(), &ApplicationConfig::default());
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let app = ThundershockBuilder::new()
            .with_name("bar")
            .with_display(320, 200)
            .with_title("Bar")
            .with_tps(30.0)
            .with_autostart(false)
            .build()
            .unwrap();

        let config = app.config();
        assert_eq!(config.name, "bar");
        assert_eq!((config.display.width, config.display.height), (320, 200));
        assert_eq!(config.display.title, "Bar");
        assert_eq!(config.timer.tps, 30.0);
        assert!(!config.timer.autostart);
    }

    #[test]
    fn builder_rejects_invalid_tps() {
        let err = ThundershockBuilder::new().with_tps(-1.0).build().unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidTickRate(_))));

        // Steps too long to represent or too short to be non-zero
        for tps in [1e-300, 1e12] {
            let err = ThundershockBuilder::new().with_tps(tps).build().unwrap_err();
            assert!(matches!(err, Error::Config(ConfigError::InvalidTickRate(_))));
        }
    }

    #[test]
    fn builder_settings_win_over_file() {
        let base =
            InstanceConfig::from_toml_str("name = \"file\"\n[display]\nwidth = 10\n").unwrap();
        let mut top = InstanceConfig::named("builder");
        top.display.height = Some(20);

        let merged = merge_overrides(base, top);
        assert_eq!(merged.name.as_deref(), Some("builder"));
        assert_eq!(merged.display.width, Some(10));
        assert_eq!(merged.display.height, Some(20));
    }

    //=====================================================================
    // Bootstrap Tests
    //=====================================================================

    #[test]
    fn nothing_is_registered_before_ready() {
        let app = Thundershock::new(None).unwrap();
        assert!(app.pool().is_empty());
        assert!(app.services().is_none());
        assert!(!app.kernel().is_started());
    }

    #[test]
    fn ready_registers_services_and_starts_kernel() {
        let app = Thundershock::new(None).unwrap();
        let (surface, environment) = headless_environment();

        app.kernel().signal_ready(environment);

        assert_eq!(
            app.pool().keys(),
            vec![CAMERA_KEY, CANVAS_MANAGER_KEY, RENDER_ENGINE_KEY]
        );
        assert!(app.kernel().is_started());
        assert!(app.timer().is_running());

        // Canvas resized to the configured display
        assert_eq!(surface.size(), (800, 600));

        let camera = app.pool().get_as::<RefCell<Camera>>(CAMERA_KEY).unwrap();
        assert_eq!(camera.borrow().width, 800.0);
        assert_eq!(camera.borrow().x, 0.0);
    }

    #[test]
    fn services_are_registered_before_kernel_start() {
        let app = Thundershock::new(None).unwrap();
        let seen = Rc::new(Cell::new(0));

        let probe = app.clone();
        let s = seen.clone();
        app.events().on(KERNEL_START, move |_| {
            s.set(probe.pool().len());
            Ok(())
        });

        let (_surface, environment) = headless_environment();
        app.kernel().signal_ready(environment);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn service_preload_emitted_per_service() {
        let app = Thundershock::new(None).unwrap();
        let names = Rc::new(RefCell::new(Vec::new()));

        let n = names.clone();
        app.events().on(SERVICE_PRELOAD, move |payload| {
            n.borrow_mut().push(payload.downcast_ref::<String>().cloned().unwrap_or_default());
            Ok(())
        });

        let (_surface, environment) = headless_environment();
        app.kernel().signal_ready(environment);
        assert_eq!(
            *names.borrow(),
            vec![CAMERA_KEY, CANVAS_MANAGER_KEY, RENDER_ENGINE_KEY]
        );
    }

    #[test]
    fn add_unknown_type_fails_without_constructing() {
        let app = Thundershock::new(None).unwrap();
        let err = app.add::<Scene, _>("UnknownType", ()).unwrap_err();
        assert_eq!(err, ObjectError::UnknownType("UnknownType".into()));
    }

    #[test]
    fn add_scene_subscribes_under_scene_id() {
        let app = Thundershock::new(None).unwrap();
        let scene = app.add_scene(SceneProps::new("scene1")).unwrap();

        let pooled = app.pool().get_as::<RefCell<Scene>>("scene1").unwrap();
        assert!(Rc::ptr_eq(&scene, &pooled));
    }

    #[test]
    fn tick_renders_frames_after_start() {
        let app = Thundershock::new(None).unwrap();
        let (surface, environment) = headless_environment();
        app.kernel().signal_ready(environment);

        assert!(app.step());
        assert!(app.step());

        let services = app.services().unwrap();
        assert_eq!(services.render_engine.frames_rendered(), 2);
        assert!(surface.redraw_requests() >= 2);
    }

    #[test]
    fn run_headless_runs_requested_frames() {
        let app = ThundershockBuilder::new().with_tps(1000.0).build().unwrap();
        assert_eq!(app.run_headless(3), 3);
        assert_eq!(app.timer().frames(), 3);
    }

    #[test]
    fn run_headless_without_autostart_runs_nothing() {
        let app = ThundershockBuilder::new().with_autostart(false).build().unwrap();
        assert_eq!(app.run_headless(3), 0);
        assert!(app.kernel().is_started());
    }
}
