//! # Core Module
//!
//! Shared configuration for every subsystem. File-format plumbing lives in
//! [`crate::config`]; the concrete structs live here.

pub mod config;

pub use config::{
    Config,
    ConfigError,
    DefaultShader,
    EngineConfig,
    LightingConfig,
    SceneSettings,
    TimeConfig,
};
