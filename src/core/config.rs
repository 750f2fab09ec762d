//=========================================================================
// Configuration
//=========================================================================
//
// Application configuration: defaults, caller overrides, validation.
//
// Flow:
//   InstanceConfig (partial, caller)  ──define_configuration()──>
//   ApplicationConfig (complete, validated)
//
// Overrides can also be read from TOML with `InstanceConfig::from_toml_str`
// or `InstanceConfig::load`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::ConfigError;

//=== Complete Configuration ==============================================

/// Display section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Thundershock".to_string(),
        }
    }
}

/// Timer section of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Fixed logic ticks per second.
    pub tps: f64,

    /// Start ticking as soon as the kernel starts.
    pub autostart: bool,

    /// Upper bound on catch-up steps run by a single `advance()`.
    pub max_steps_per_frame: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            autostart: true,
            max_steps_per_frame: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Name of the camera created during bootstrap.
    pub name: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
    pub display: DisplayConfig,
    pub timer: TimerConfig,
    pub camera: CameraConfig,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "thundershock".to_string(),
            display: DisplayConfig::default(),
            timer: TimerConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl ApplicationConfig {
    /// Checks the invariants every consumer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::InvalidDisplaySize {
                width: self.display.width,
                height: self.display.height,
            });
        }
        if step_for_rate(self.timer.tps).is_none() {
            return Err(ConfigError::InvalidTickRate(self.timer.tps));
        }
        if self.timer.max_steps_per_frame == 0 {
            return Err(ConfigError::InvalidStepLimit);
        }
        Ok(())
    }
}

/// Fixed step for `tps` ticks per second.
///
/// `None` unless the rate is finite and positive and its step is a
/// non-zero, representable `Duration`.
pub(crate) fn step_for_rate(tps: f64) -> Option<Duration> {
    if !tps.is_finite() || tps <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / tps)
        .ok()
        .filter(|step| !step.is_zero())
}

//=== Partial Configuration ===============================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimerOverrides {
    pub tps: Option<f64>,
    pub autostart: Option<bool>,
    pub max_steps_per_frame: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraOverrides {
    pub name: Option<String>,
}

/// Caller-supplied configuration; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceConfig {
    pub name: Option<String>,
    pub display: DisplayOverrides,
    pub timer: TimerOverrides,
    pub camera: CameraOverrides,
}

impl InstanceConfig {
    /// Overrides that only set the application name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads overrides from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

//=== Merge ===============================================================

/// Merges `overrides` over the defaults and validates the result.
pub fn define_configuration(
    overrides: Option<InstanceConfig>,
) -> Result<ApplicationConfig, ConfigError> {
    let mut config = ApplicationConfig::default();

    if let Some(overrides) = overrides {
        if let Some(name) = overrides.name {
            config.name = name;
        }

        let display = overrides.display;
        if let Some(width) = display.width {
            config.display.width = width;
        }
        if let Some(height) = display.height {
            config.display.height = height;
        }
        if let Some(title) = display.title {
            config.display.title = title;
        }

        let timer = overrides.timer;
        if let Some(tps) = timer.tps {
            config.timer.tps = tps;
        }
        if let Some(autostart) = timer.autostart {
            config.timer.autostart = autostart;
        }
        if let Some(steps) = timer.max_steps_per_frame {
            config.timer.max_steps_per_frame = steps;
        }

        if let Some(name) = overrides.camera.name {
            config.camera.name = name;
        }
    }

    config.validate()?;
    Ok(config)
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_yields_defaults() {
        let config = define_configuration(None).unwrap();
        assert_eq!(config, ApplicationConfig::default());
    }

    #[test]
    fn overrides_replace_only_set_fields() {
        let mut overrides = InstanceConfig::named("bar");
        overrides.display.width = Some(1024);

        let config = define_configuration(Some(overrides)).unwrap();
        assert_eq!(config.name, "bar");
        assert_eq!(config.display.width, 1024);
        assert_eq!(config.display.height, DisplayConfig::default().height);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = define_configuration(Some(InstanceConfig::named("  "))).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));
    }

    #[test]
    fn zero_display_is_rejected() {
        let mut overrides = InstanceConfig::default();
        overrides.display.height = Some(0);

        let err = define_configuration(Some(overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDisplaySize { height: 0, .. }));
    }

    #[test]
    fn non_positive_tps_is_rejected() {
        let mut overrides = InstanceConfig::default();
        overrides.timer.tps = Some(0.0);
        assert!(matches!(
            define_configuration(Some(overrides)),
            Err(ConfigError::InvalidTickRate(_))
        ));

        let mut overrides = InstanceConfig::default();
        overrides.timer.tps = Some(f64::NAN);
        assert!(define_configuration(Some(overrides)).is_err());
    }

    #[test]
    fn unrepresentable_tick_steps_are_rejected() {
        // Step too long for a Duration
        let overrides = InstanceConfig::from_toml_str("[timer]\ntps = 1e-300").unwrap();
        assert!(matches!(
            define_configuration(Some(overrides)),
            Err(ConfigError::InvalidTickRate(_))
        ));

        // Step rounds down to zero nanoseconds
        let mut overrides = InstanceConfig::default();
        overrides.timer.tps = Some(1e12);
        assert!(matches!(
            define_configuration(Some(overrides)),
            Err(ConfigError::InvalidTickRate(_))
        ));
    }

    #[test]
    fn step_for_rate_bounds() {
        assert_eq!(step_for_rate(50.0), Some(Duration::from_millis(20)));
        assert_eq!(step_for_rate(1e12), None);
        assert_eq!(step_for_rate(1e-300), None);
        assert_eq!(step_for_rate(f64::INFINITY), None);
        assert_eq!(step_for_rate(-1.0), None);
    }

    #[test]
    fn parses_partial_toml() {
        let overrides = InstanceConfig::from_toml_str(
            r#"
            name = "from-file"

            [display]
            width = 320
            height = 240

            [timer]
            tps = 30.0
            "#,
        )
        .unwrap();

        let config = define_configuration(Some(overrides)).unwrap();
        assert_eq!(config.name, "from-file");
        assert_eq!(config.display.width, 320);
        assert_eq!(config.timer.tps, 30.0);
        assert!(config.timer.autostart);
    }

    #[test]
    fn unknown_toml_field_is_rejected() {
        let err = InstanceConfig::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = InstanceConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
