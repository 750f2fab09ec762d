//=========================================================================
// Object Factory
//=========================================================================
//
// Registry of named constructors used by `Thundershock::add`.
//
// Architecture:
//   register("Scene", |kernel, props: SceneProps| Scene::new(..))
//        ↓
//   HashMap<String, Constructor>   (payload and output type-erased)
//        ↓
//   create::<Scene, _>(kernel, "Scene", props) → Rc<RefCell<Scene>>
//
// Unknown kinds and type mismatches are reported as `ObjectError`;
// nothing is constructed in either case.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Internal Dependencies ===============================================

use crate::core::display::{Camera, CameraOptions};
use crate::core::kernel::Kernel;
use crate::core::scene::{Scene, SceneProps};
use crate::error::ObjectError;

//=== ObjectFactory =======================================================

type Constructor = Rc<dyn Fn(&Kernel, Box<dyn Any>) -> Result<Rc<dyn Any>, ObjectError>>;

/// Maps kind names to constructors.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct ObjectFactory {
    constructors: Rc<RefCell<HashMap<String, Constructor>>>,
}

impl ObjectFactory {
    /// Creates an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory that knows the built-in kinds `Scene` and `Camera`.
    pub fn with_defaults() -> Self {
        let factory = Self::new();
        factory.register("Scene", |kernel: &Kernel, props: SceneProps| Scene::new(kernel, props));
        factory.register("Camera", |kernel: &Kernel, options: CameraOptions| {
            Camera::new(kernel, options)
        });
        factory
    }

    //--- Registration -----------------------------------------------------

    /// Registers `constructor` under `kind`, replacing any previous one.
    ///
    /// Objects are returned as `Rc<RefCell<T>>`.
    pub fn register<P, T, F>(&self, kind: impl Into<String>, constructor: F)
    where
        P: Any,
        T: Any,
        F: Fn(&Kernel, P) -> T + 'static,
    {
        let kind = kind.into();
        let name = kind.clone();

        let erased: Constructor = Rc::new(
            move |kernel: &Kernel, payload: Box<dyn Any>| -> Result<Rc<dyn Any>, ObjectError> {
                let payload = payload
                    .downcast::<P>()
                    .map_err(|_| ObjectError::PayloadMismatch { kind: name.clone() })?;
                let object: Rc<dyn Any> = Rc::new(RefCell::new(constructor(kernel, *payload)));
                Ok(object)
            },
        );

        if self.constructors.borrow_mut().insert(kind.clone(), erased).is_some() {
            debug!(target: "factory", "Constructor {} replaced", kind);
        }
    }

    //--- Construction -----------------------------------------------------

    /// Constructs a `kind` object from `payload`.
    pub fn create<T, P>(
        &self,
        kernel: &Kernel,
        kind: &str,
        payload: P,
    ) -> Result<Rc<RefCell<T>>, ObjectError>
    where
        T: Any,
        P: Any,
    {
        let constructor = self
            .constructors
            .borrow()
            .get(kind)
            .cloned()
            .ok_or_else(|| ObjectError::UnknownType(kind.to_string()))?;

        let object = constructor(kernel, Box::new(payload))?;

        object
            .downcast::<RefCell<T>>()
            .map_err(|_| ObjectError::OutputMismatch { kind: kind.to_string() })
    }

    //--- Query API --------------------------------------------------------

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.borrow().contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.constructors.borrow().keys().cloned().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("kinds", &self.kinds())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
