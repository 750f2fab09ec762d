//=========================================================================
// Scene System
//=========================================================================
//
// A scene is one unit of game content with lifecycle hooks.
//
// Lifecycle:
//   Idle ──start()──> Preloading ──status 200──> Running
//                        │  │
//                        │  └──other status──> Failed(status)
//                        └──cancel()─────────> Cancelled
//
// Entering Running calls init → create → start, then emits SCENE_CHANGE
// with the scene id. Scenes are created through the object factory and
// stored in the publisher under their id.
//
//=========================================================================

//=== Module Declarations =================================================

mod preload;

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::event::SCENE_CHANGE;
use crate::core::kernel::Kernel;

//=== Public API ==========================================================

pub use preload::{Preload, PreloadPoll, PreloadStatus, PreloadTask};

//=== SceneHooks ==========================================================

/// Lifecycle hooks supplied by game code.
///
/// Every hook has a default. The default `preload` completes immediately
/// with status 200.
///
/// ```rust
/// # use thundershock::prelude::*;
/// # use std::time::Duration;
/// struct Level;
///
/// impl SceneHooks for Level {
///     fn preload(&mut self, loader: &mut Preload, _context: &SceneContext) {
///         loader.complete_after(Duration::from_secs(3), 200);
///     }
///
///     fn start(&mut self) {
///         println!("scene start");
///     }
/// }
/// ```
pub trait SceneHooks {
    /// Called by `Scene::start()`; must request completion on `loader`.
    fn preload(&mut self, loader: &mut Preload, _context: &SceneContext) {
        loader.complete(PreloadStatus::OK.0);
    }

    /// Called first once preload succeeds.
    fn init(&mut self) {}

    /// Called after `init`.
    fn create(&mut self, _context: &SceneContext) {}

    /// Called last; the scene is running afterwards.
    fn start(&mut self) {}
}

/// Hooks that keep every default.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyHooks;

impl SceneHooks for EmptyHooks {}

//=== SceneProps ==========================================================

/// Descriptor used to create a scene.
pub struct SceneProps {
    pub id: String,
    pub cameras: Vec<String>,
    pub hooks: Box<dyn SceneHooks>,
}

impl SceneProps {
    /// Props with no cameras and default hooks.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cameras: Vec::new(),
            hooks: Box::new(EmptyHooks),
        }
    }

    pub fn with_camera(mut self, name: impl Into<String>) -> Self {
        self.cameras.push(name.into());
        self
    }

    pub fn with_hooks(mut self, hooks: impl SceneHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }
}

impl fmt::Debug for SceneProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneProps")
            .field("id", &self.id)
            .field("cameras", &self.cameras)
            .finish()
    }
}

//=== SceneContext ========================================================

/// Data handed to `preload` and `create`.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub kernel: Kernel,
    pub id: String,
    pub cameras: Vec<String>,
}

//=== SceneState ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Idle,
    Preloading,
    Running,
    Failed(PreloadStatus),
    Cancelled,
}

//=== Scene ===============================================================

pub struct Scene {
    context: SceneContext,
    hooks: Box<dyn SceneHooks>,
    state: SceneState,
    task: Option<PreloadTask>,
}

impl Scene {
    pub fn new(kernel: &Kernel, props: SceneProps) -> Self {
        debug!(target: "scene", "Scene {} created", props.id);
        Self {
            context: SceneContext {
                kernel: kernel.clone(),
                id: props.id,
                cameras: props.cameras,
            },
            hooks: props.hooks,
            state: SceneState::Idle,
            task: None,
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.context.id
    }

    /// Camera names, in the order given.
    pub fn cameras(&self) -> &[String] {
        &self.context.cameras
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SceneState::Running
    }

    //--- Lifecycle --------------------------------------------------------

    /// Begins preloading. A synchronous preload runs the scene right away.
    ///
    /// Only an idle scene can be started; other states are returned as is.
    pub fn start(&mut self) -> SceneState {
        if self.state != SceneState::Idle {
            warn!(target: "scene", "Scene {} already started ({:?})", self.id(), self.state);
            return self.state;
        }

        debug!(target: "scene", "Scene {} preloading", self.id());
        self.state = SceneState::Preloading;

        let mut loader = Preload::new();
        self.hooks.preload(&mut loader, &self.context);
        self.task = Some(loader.into_task());

        self.update()
    }

    /// Advances a pending preload. Called once per timer step.
    pub fn update(&mut self) -> SceneState {
        if self.state != SceneState::Preloading {
            return self.state;
        }

        let poll = match self.task.as_mut() {
            Some(task) => task.poll(),
            None => PreloadPoll::Pending,
        };

        match poll {
            PreloadPoll::Pending => {}
            PreloadPoll::Ready(status) if status.is_ok() => self.enter_running(),
            PreloadPoll::Ready(status) => {
                error!(
                    target: "scene",
                    "Scene {} preload failed with status {}",
                    self.id(),
                    status
                );
                self.task = None;
                self.state = SceneState::Failed(status);
            }
            PreloadPoll::Cancelled => {
                warn!(target: "scene", "Scene {} preload was abandoned", self.id());
                self.task = None;
                self.state = SceneState::Cancelled;
            }
        }

        self.state
    }

    /// Cancels a pending preload. Returns false if nothing was pending.
    pub fn cancel(&mut self) -> bool {
        if self.state != SceneState::Preloading {
            return false;
        }

        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
        self.task = None;
        self.state = SceneState::Cancelled;
        info!(target: "scene", "Scene {} preload cancelled", self.id());
        true
    }

    fn enter_running(&mut self) {
        self.task = None;

        self.hooks.init();
        self.hooks.create(&self.context);
        self.hooks.start();

        self.state = SceneState::Running;
        info!(target: "scene", "Scene {} running", self.id());

        let id = self.context.id.clone();
        self.context.kernel.events().emit_with(SCENE_CHANGE, &id);
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.context.id)
            .field("cameras", &self.context.cameras)
            .field("state", &self.state)
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
