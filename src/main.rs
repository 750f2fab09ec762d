use std::env;
use std::time::Duration;

use log::info;
use thiserror::Error;

use thundershock::prelude::*;
use thundershock::Error as AppError;

const DEFAULT_HEADLESS_FRAMES: u64 = 240;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let options = CliOptions::parse()?;

    let mut builder = ThundershockBuilder::new().with_name("bar");
    if let Some(path) = &options.config {
        builder = builder.with_config_file(path);
    }
    let app = builder.build()?;

    let game = app.clone();
    app.events().on(KERNEL_START, move |_| {
        let camera = game.config().camera.name.clone();
        let scene = game.add_scene(
            SceneProps::new("scene1")
                .with_camera(camera)
                .with_hooks(DemoScene),
        )?;
        scene.borrow_mut().start();
        Ok(())
    });

    if options.headless {
        app.run_headless(options.frames);
        return Ok(());
    }

    match app.run() {
        Ok(()) => Ok(()),
        Err(AppError::Platform(err)) => {
            eprintln!("{err}. Falling back to --headless mode.");
            app.run_headless(options.frames);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

//=== DemoScene ===========================================================

struct DemoScene;

impl SceneHooks for DemoScene {
    fn preload(&mut self, loader: &mut Preload, _context: &SceneContext) {
        info!("foobar");
        loader.complete_after(Duration::from_secs(3), 200);
    }

    fn init(&mut self) {
        info!("Scene init");
    }

    fn create(&mut self, context: &SceneContext) {
        info!("Create some magic in {}", context.id);
    }

    fn start(&mut self) {
        info!("scene start");
    }
}

//=== CliOptions ==========================================================

#[derive(Debug, Error)]
enum CliError {
    #[error("Usage: thundershock [--headless] [--frames N] [--config PATH]")]
    Usage,

    #[error("Unknown argument: {0}. Expected --headless, --frames or --config")]
    UnknownArgument(String),

    #[error("invalid frame count: {0}")]
    InvalidFrames(String),

    #[error(transparent)]
    App(#[from] AppError),
}

struct CliOptions {
    headless: bool,
    frames: u64,
    config: Option<String>,
}

impl CliOptions {
    fn parse() -> Result<Self, CliError> {
        let mut args = env::args().skip(1);
        let mut headless = false;
        let mut frames = DEFAULT_HEADLESS_FRAMES;
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => headless = true,
                "--frames" => {
                    let value = args.next().ok_or(CliError::Usage)?;
                    frames = value.parse().map_err(|_| CliError::InvalidFrames(value))?;
                }
                "--config" => config = Some(args.next().ok_or(CliError::Usage)?),
                "-h" | "--help" => return Err(CliError::Usage),
                other => return Err(CliError::UnknownArgument(other.to_string())),
            }
        }

        Ok(Self {
            headless,
            frames,
            config,
        })
    }
}
