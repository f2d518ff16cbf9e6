//! Development scene
//!
//! Loads `scenes/dev_scene.ron` (or a small built-in scene when the file is
//! missing), then drives it headlessly: simulated frame timestamps, a camera
//! switch through the digit keys, draw recording and a pick through the
//! centre of the viewport, whose ray is then drawn by any `RayRenderer`.

use std::time::Duration;

use scene_engine::config::{Config, ConfigError};
use scene_engine::core::config::EngineConfig;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::scene::{ComponentDescription, EntityDescription, TransformDescription};

const ENGINE_CONFIG_PATH: &str = "config/engine.toml";
const SCENE_PATH: &str = "scenes/dev_scene.ron";

/// Frames simulated before exiting
const FRAME_COUNT: u32 = 180;
/// Simulated frame interval, roughly 60 Hz
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, thiserror::Error)]
enum DevSceneError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}

struct DevScene {
    scene: Scene,
    recorder: CommandRecorder,
    now: Duration,
}

impl DevScene {
    fn new() -> Result<Self, DevSceneError> {
        let config = EngineConfig::load_or_default(ENGINE_CONFIG_PATH)?;
        config.validate()?;
        logging::init(&config.log_level);

        let description = if std::path::Path::new(SCENE_PATH).exists() {
            SceneDescription::load_from_file(SCENE_PATH)?
        } else {
            log::info!("No scene at {}, using the built-in scene", SCENE_PATH);
            builtin_scene()
        };
        log::info!(
            "Building scene '{}' with {} entities",
            description.name,
            description.entities.len()
        );

        let mut scene = Scene::from_description(&description, &config)?;
        scene.set_asset_source(Box::new(builtin_assets()));

        Ok(Self {
            scene,
            recorder: CommandRecorder::new(),
            now: Duration::ZERO,
        })
    }

    fn run(&mut self) {
        for frame in 0..FRAME_COUNT {
            self.script_input(frame);
            self.scene.update(self.now);
            self.recorder.clear();
            self.scene.render(&mut self.recorder);

            if frame % 60 == 0 {
                log::info!(
                    "Frame {}: {} draws, {} lights, day time {:.3}",
                    frame,
                    self.recorder.draw_count(),
                    self.scene.light_buffer().count(),
                    self.scene.time().day_time()
                );
            }
            self.now += FRAME_INTERVAL;
        }

        if let Some(ball) = self.scene.find_entity("ball") {
            if let Some(position) = self.scene.world_position(ball) {
                log::info!("Ball settled at ({:.2}, {:.2}, {:.2})", position.x, position.y, position.z);
            }
        }
        if self.scene.time().dropped_fixed_steps() > 0 {
            log::warn!("Dropped {} fixed steps", self.scene.time().dropped_fixed_steps());
        }
        self.pick_center();
    }

    /// Switch to the second camera for a second, then back
    fn script_input(&mut self, frame: u32) {
        let input = self.scene.input_mut();
        match frame {
            60 => input.key_down(KeyCode::Digit2),
            61 => input.key_up(KeyCode::Digit2),
            120 => input.key_down(KeyCode::Digit1),
            121 => input.key_up(KeyCode::Digit1),
            _ => {}
        }
    }

    fn pick_center(&mut self) {
        let viewport = self.scene.viewport();
        let (x, y) = (viewport.x * 0.5, viewport.y * 0.5);
        match self.scene.pick(x, y) {
            Some(hit) => {
                let name = self.scene.entity(hit.entity).map_or("<gone>", |entity| entity.name());
                log::info!("Centre of the screen hits '{}' at {:.3}", name, hit.distance);
            }
            None => log::info!("Centre of the screen hits nothing"),
        }

        let Some(ray) = self.scene.screen_ray(x, y) else {
            return;
        };
        let Some(marker) = self.scene.find_entity("pick ray") else {
            return;
        };
        if let Some(renderer) = self.scene.component_mut::<RayRenderer>(marker) {
            renderer.set_ray(ray);
        }
        self.recorder.clear();
        self.scene.render(&mut self.recorder);
        log::info!("Pick ray drawn, {} draws in the final frame", self.recorder.draw_count());
    }
}

fn builtin_assets() -> InMemoryAssets {
    let mut assets = InMemoryAssets::with_builtin_shaders();
    assets.insert_box_model("models/crate.obj", BoundingBox::new(Vec3::repeat(-1.0), Vec3::repeat(1.0)));
    assets.register_texture("textures/sign.png");
    assets
}

fn builtin_scene() -> SceneDescription {
    SceneDescription {
        name: "built-in".to_string(),
        active_camera: Some("camera".to_string()),
        entities: vec![
            EntityDescription {
                name: "camera".to_string(),
                transform: TransformDescription {
                    position: Vec3::new(0.0, 0.0, -8.0),
                    ..TransformDescription::default()
                },
                components: vec![
                    ComponentDescription::Camera { fov: None, render_grid: None },
                    ComponentDescription::Movement { speed: None, sensitivity: None },
                ],
                ..EntityDescription::default()
            },
            EntityDescription {
                name: "crate".to_string(),
                model: Some("models/crate.obj".to_string()),
                components: vec![ComponentDescription::PointLight {
                    color: None,
                    intensity: Some(2.0),
                }],
                ..EntityDescription::default()
            },
            EntityDescription {
                name: "hills".to_string(),
                transform: TransformDescription {
                    position: Vec3::new(-1.0, -1.5, 5.0),
                    scale: Vec3::repeat(0.1),
                    ..TransformDescription::default()
                },
                components: vec![ComponentDescription::Terrain {
                    height: Some(4.0),
                    width: Some(20),
                    depth: Some(20),
                    scale: Some(0.3),
                    offset: None,
                    seed: None,
                }],
                ..EntityDescription::default()
            },
            EntityDescription {
                name: "pick ray".to_string(),
                components: vec![ComponentDescription::RayRenderer {
                    color: Some(Vec3::new(1.0, 0.2, 0.2)),
                    length: Some(50.0),
                }],
                ..EntityDescription::default()
            },
        ],
        ..SceneDescription::default()
    }
}

fn main() {
    let mut app = match DevScene::new() {
        Ok(app) => app,
        Err(err) => {
            // The logger may not be up yet.
            eprintln!("Failed to start dev scene: {}", err);
            std::process::exit(1);
        }
    };
    app.run();
    log::info!("Dev scene finished");
}
