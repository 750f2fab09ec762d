//=========================================================================
// Errors
//=========================================================================
//
// Typed failure channels for every fallible operation in the crate.
//
// Taxonomy:
//   ConfigError   - invalid or unreadable application configuration
//   ObjectError   - object factory lookups (`Thundershock::add`)
//   PlatformError - host window / event loop failures
//   HandlerError  - failures returned by event bus listeners
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== ConfigError =========================================================

/// Configuration could not be merged, validated or loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("application name must not be empty")]
    EmptyName,

    #[error("display size must be positive, got {width}x{height}")]
    InvalidDisplaySize { width: u32, height: u32 },

    #[error("timer rate must be positive, got {0} ticks per second")]
    InvalidTickRate(f64),

    #[error("timer must allow at least one step per frame")]
    InvalidStepLimit,

    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

//=== ObjectError =========================================================

/// The object factory could not produce the requested object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObjectError {
    #[error("unable to create new game object from undefined constructor: {0}")]
    UnknownType(String),

    #[error("constructor {kind} received a payload of the wrong type")]
    PayloadMismatch { kind: String },

    #[error("constructor {kind} produced a different object type than requested")]
    OutputMismatch { kind: String },
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal for the desktop run loop; callers may fall back to
/// [`crate::Thundershock::run_headless`].
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    WindowCreation(String),
}

//=== HandlerError ========================================================

/// Error returned by an event listener.
///
/// The bus logs it and keeps delivering to the remaining listeners.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ObjectError> for HandlerError {
    fn from(err: ObjectError) -> Self {
        Self(err.to_string())
    }
}

//=== Crate Error =========================================================

/// Top-level error for application bootstrap and execution.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//=========================================================================
// Tests
//=========================================================================
