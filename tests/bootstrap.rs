//=========================================================================
// Bootstrap Integration Tests
//
// Drives the public API end to end against a headless surface.
//
//=========================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thundershock::core::display::{HeadlessSurface, Surface};
use thundershock::error::ConfigError;
use thundershock::prelude::*;
use thundershock::{Error, CAMERA_KEY, CANVAS_MANAGER_KEY, RENDER_ENGINE_KEY};

fn fast_app() -> Thundershock {
    ThundershockBuilder::new().with_name("bar").with_tps(1000.0).build().unwrap()
}

fn signal_headless(app: &Thundershock) -> Rc<HeadlessSurface> {
    let surface = Rc::new(HeadlessSurface::new(1, 1));
    app.kernel().signal_ready(Environment::new(surface.clone()));
    surface
}

//=========================================================================
// Event Bus Properties
//=========================================================================

#[test]
fn handlers_run_in_registration_order_once_per_emission() {
    let bus = EventBus::new();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for tag in ["h1", "h2"] {
        let calls = calls.clone();
        bus.on("custom", move |_| {
            calls.borrow_mut().push(tag);
            Ok(())
        });
    }

    bus.emit("custom");
    bus.emit("custom");
    assert_eq!(*calls.borrow(), vec!["h1", "h2", "h1", "h2"]);
}

#[test]
fn emission_never_reaches_other_event_names() {
    let bus = EventBus::new();
    let hits = Rc::new(Cell::new(0));

    let h = hits.clone();
    bus.on(SCENE_CHANGE, move |_| {
        h.set(h.get() + 1);
        Ok(())
    });

    let report = bus.emit(KERNEL_START);
    assert_eq!(hits.get(), 0);
    assert_eq!(report.invoked(), 0);
}

//=========================================================================
// Publisher Properties
//=========================================================================

#[test]
fn publisher_returns_subscribed_object_by_identity() {
    let publisher = Publisher::new();
    let camera = Rc::new(String::from("camera"));

    publisher.subscribe("Camera", camera.clone());

    let found = publisher.get_as::<String>("Camera").unwrap();
    assert!(Rc::ptr_eq(&camera, &found));
}

#[test]
fn publisher_overwrite_leaves_only_latest_value() {
    let publisher = Publisher::new();
    let first = Rc::new(1u32);
    let second = Rc::new(2u32);

    publisher.subscribe("k", first.clone());
    publisher.subscribe("k", second.clone());

    let found = publisher.get_as::<u32>("k").unwrap();
    assert!(Rc::ptr_eq(&second, &found));
    assert_eq!(Rc::strong_count(&first), 1, "publisher must release v1");
}

#[test]
fn publisher_miss_is_none() {
    let publisher = Publisher::new();
    assert!(publisher.get("never").is_none());
    assert!(publisher.get_as::<u32>("never").is_none());
}

//=========================================================================
// Kernel Properties
//=========================================================================

#[test]
fn ready_after_readiness_runs_immediately() {
    let app = fast_app();
    signal_headless(&app);

    let ran = Rc::new(Cell::new(false));
    let r = ran.clone();
    app.kernel().ready(move |_| r.set(true));

    assert!(ran.get());
}

#[test]
fn start_emits_kernel_start_once() {
    let kernel = Kernel::new(ApplicationConfig::default());
    let seen = Rc::new(Cell::new(0));

    let s = seen.clone();
    kernel.events().on(KERNEL_START, move |_| {
        s.set(s.get() + 1);
        Ok(())
    });

    kernel.start();
    assert_eq!(seen.get(), 1);
}

#[test]
fn kernel_start_handlers_fire_in_registration_order() {
    let app = fast_app();
    let order = Rc::new(RefCell::new(Vec::new()));

    for tag in ["first", "second"] {
        let order = order.clone();
        app.events().on(KERNEL_START, move |_| {
            order.borrow_mut().push(tag);
            Ok(())
        });
    }

    signal_headless(&app);
    assert_eq!(*order.borrow(), vec!["first", "second"]);
}

//=========================================================================
// Application Bootstrap
//=========================================================================

#[test]
fn bootstrap_registers_display_services() {
    let app = fast_app();
    let surface = signal_headless(&app);

    for key in [CAMERA_KEY, CANVAS_MANAGER_KEY, RENDER_ENGINE_KEY] {
        assert!(app.pool().contains(key), "missing service {key}");
    }

    let camera = app.pool().get_as::<RefCell<Camera>>(CAMERA_KEY).unwrap();
    assert_eq!(camera.borrow().name, app.config().camera.name);
    assert_eq!(surface.size(), (800, 600));
}

#[test]
fn add_unknown_type_is_a_typed_failure() {
    let app = fast_app();
    let result = app.add::<Scene, _>("UnknownType", ());
    assert_eq!(
        result.unwrap_err(),
        ObjectError::UnknownType("UnknownType".into())
    );
}

#[test]
fn invalid_configuration_is_rejected() {
    let err = ThundershockBuilder::new().with_display(0, 600).build().unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidDisplaySize { width: 0, .. })
    ));
}

#[test]
fn configuration_file_feeds_the_builder() {
    let path = std::env::temp_dir().join(format!("thundershock-{}.toml", std::process::id()));
    std::fs::write(&path, "name = \"from-file\"\n[display]\nwidth = 320\n").unwrap();

    let app = ThundershockBuilder::new().with_config_file(&path).build().unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(app.config().name, "from-file");
    assert_eq!(app.config().display.width, 320);
}

//=========================================================================
// Scenes
//=========================================================================

struct StatusPreload {
    status: u16,
}

impl SceneHooks for StatusPreload {
    fn preload(&mut self, loader: &mut Preload, _context: &SceneContext) {
        loader.complete(self.status);
    }
}

#[test]
fn synchronous_preload_status_decides_scene_state() {
    let app = fast_app();

    let ok = app
        .add_scene(SceneProps::new("ok").with_hooks(StatusPreload { status: 200 }))
        .unwrap();
    let missing = app
        .add_scene(SceneProps::new("missing").with_hooks(StatusPreload { status: 404 }))
        .unwrap();

    assert_eq!(ok.borrow_mut().start(), SceneState::Running);
    assert_eq!(ok.borrow().state(), SceneState::Running);

    assert_eq!(
        missing.borrow_mut().start(),
        SceneState::Failed(PreloadStatus(404))
    );
    assert!(!missing.borrow().is_running());
}

#[test]
fn scene_added_on_kernel_start_runs_in_headless_loop() {
    let app = fast_app();
    let changes = Rc::new(RefCell::new(Vec::new()));

    let game = app.clone();
    app.events().on(KERNEL_START, move |_| {
        let camera = game.config().camera.name.clone();
        let scene = game.add_scene(SceneProps::new("scene1").with_camera(camera))?;
        scene.borrow_mut().start();
        Ok(())
    });

    let c = changes.clone();
    app.events().on(SCENE_CHANGE, move |payload| {
        if let Some(id) = payload.downcast_ref::<String>() {
            c.borrow_mut().push(id.clone());
        }
        Ok(())
    });

    assert_eq!(app.run_headless(5), 5);

    let scene = app.pool().get_as::<RefCell<Scene>>("scene1").unwrap();
    assert!(scene.borrow().is_running());
    assert_eq!(scene.borrow().cameras(), ["main".to_string()]);
    assert_eq!(*changes.borrow(), vec!["scene1"]);

    let services = app.services().unwrap();
    assert_eq!(services.render_engine.frames_rendered(), 5);
}

#[test]
fn delayed_preload_completes_during_frame_updates() {
    struct Delayed;

    impl SceneHooks for Delayed {
        fn preload(&mut self, loader: &mut Preload, _context: &SceneContext) {
            loader.complete_after(std::time::Duration::from_millis(20), 200);
        }
    }

    let app = fast_app();
    let scene = app.add_scene(SceneProps::new("later").with_hooks(Delayed)).unwrap();
    signal_headless(&app);

    assert_eq!(scene.borrow_mut().start(), SceneState::Preloading);

    std::thread::sleep(std::time::Duration::from_millis(60));
    app.step();

    assert!(scene.borrow().is_running());
}
