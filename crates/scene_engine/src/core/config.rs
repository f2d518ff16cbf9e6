//! # Engine Configuration
//!
//! Serializable settings for a scene: logging, the two clocks, light capacity
//! and the per-scene render/camera switches. Every struct has sensible
//! defaults, `with_*` builders and a `validate` pass.
//!
//! ```rust
//! use scene_engine::core::config::{EngineConfig, TimeConfig};
//!
//! let config = EngineConfig::default()
//!     .with_time(TimeConfig::default().with_fixed_step_ms(10));
//! assert!(config.validate().is_ok());
//! ```

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::render::lighting::MAX_LIGHTS;

/// # Time Configuration
///
/// Fixed physics step, catch-up cap and day-cycle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Physics step in milliseconds
    pub fixed_step_ms: u64,
    /// Maximum fixed steps run in a single frame before the backlog is dropped
    pub max_fixed_steps_per_frame: u32,
    /// Real seconds per day cycle
    pub day_duration: f32,
    /// Day-cycle speed multiplier
    pub scale: f32,
}

impl TimeConfig {
    /// Set the physics step
    pub fn with_fixed_step_ms(mut self, step: u64) -> Self {
        self.fixed_step_ms = step;
        self
    }

    /// Set the per-frame catch-up cap
    pub fn with_max_fixed_steps_per_frame(mut self, steps: u32) -> Self {
        self.max_fixed_steps_per_frame = steps;
        self
    }

    /// Set the day length in seconds
    pub fn with_day_duration(mut self, seconds: f32) -> Self {
        self.day_duration = seconds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_step_ms == 0 {
            return Err(ConfigError::Invalid("Fixed step must be at least 1 ms".to_string()));
        }
        if self.max_fixed_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "At least one fixed step per frame is required".to_string(),
            ));
        }
        if self.day_duration <= 0.0 {
            return Err(ConfigError::Invalid("Day duration must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_step_ms: 20,
            max_fixed_steps_per_frame: 8,
            day_duration: 30.0,
            scale: 1.0,
        }
    }
}

/// # Lighting Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Registered light capacity, at most [`MAX_LIGHTS`]
    pub max_lights: usize,
}

impl LightingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lights > MAX_LIGHTS {
            return Err(ConfigError::Invalid(format!(
                "max_lights {} exceeds the light buffer capacity of {}",
                self.max_lights, MAX_LIGHTS
            )));
        }
        Ok(())
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self { max_lights: MAX_LIGHTS }
    }
}

/// Shading model used for meshes that don't name their own shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultShader {
    /// Blinn-Phong
    Phong,
    /// Physically based
    Pbr,
}

impl DefaultShader {
    /// Name the asset source resolves
    pub fn shader_name(self) -> &'static str {
        match self {
            Self::Phong => "phong",
            Self::Pbr => "pbr",
        }
    }
}

/// # Scene Settings
///
/// Runtime switches the inspector can flip while a scene runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Digit keys switch between cameras
    pub do_camera_switching: bool,
    /// The active camera draws the sky
    pub do_render_sky: bool,
    /// The active camera draws the ground grid
    pub do_render_grid: bool,
    /// Mesh and spline renderers draw their bounding boxes
    pub render_bounding_boxes: bool,
    /// Shader for loaded meshes
    pub default_shader: DefaultShader,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            do_camera_switching: true,
            do_render_sky: false,
            do_render_grid: true,
            render_bounding_boxes: false,
            default_shader: DefaultShader::Pbr,
        }
    }
}

/// # Engine Configuration
///
/// Top-level configuration loaded by hosts and the demo binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Clock configuration
    pub time: TimeConfig,
    /// Light capacity
    pub lighting: LightingConfig,
    /// Initial scene settings
    pub settings: SceneSettings,
}

impl EngineConfig {
    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set clock configuration
    pub fn with_time(mut self, time: TimeConfig) -> Self {
        self.time = time;
        self
    }

    /// Set light capacity
    pub fn with_max_lights(mut self, max_lights: usize) -> Self {
        self.lighting.max_lights = max_lights;
        self
    }

    /// Set scene settings
    pub fn with_settings(mut self, settings: SceneSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("Unknown log level: {}", self.log_level)));
        }
        self.time.validate()?;
        self.lighting.validate()?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            time: TimeConfig::default(),
            lighting: LightingConfig::default(),
            settings: SceneSettings::default(),
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        let settings = SceneSettings::default();
        assert!(settings.do_camera_switching);
        assert!(!settings.do_render_sky);
        assert!(settings.do_render_grid);
        assert_eq!(settings.default_shader.shader_name(), "pbr");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = EngineConfig::default().with_max_lights(MAX_LIGHTS + 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = EngineConfig::default().with_time(TimeConfig::default().with_fixed_step_ms(0));
        assert!(config.validate().is_err());

        let config = EngineConfig::default().with_log_level("loud");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::parse(
            "engine.ron",
            "(log_level: \"debug\", time: (fixed_step_ms: 10))",
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.time.fixed_step_ms, 10);
        assert_eq!(config.time.max_fixed_steps_per_frame, 8);
        assert_eq!(config.settings, SceneSettings::default());
    }

    #[test]
    fn test_toml_parsing() {
        let config = EngineConfig::parse(
            "engine.toml",
            "log_level = \"warn\"\n[settings]\ndefault_shader = \"phong\"\ndo_render_sky = true\n",
        )
        .unwrap();
        assert_eq!(config.settings.default_shader, DefaultShader::Phong);
        assert!(config.settings.do_render_sky);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = EngineConfig::parse("engine.json", "{}");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
