//! Viewer configuration, optionally read from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub fps: f32,
    /// Edge length of a square tile in pixels.
    pub tile_size: u32,
    /// Number of render workers, 0 picks the number of available cores.
    pub workers: usize,
    pub fov_vertical: f32,
    pub near: f32,
    pub far: f32,

    pub model_path: PathBuf,
    pub texture_path: PathBuf,
    pub skybox_path: Option<PathBuf>,
    pub skybox_texture_path: Option<PathBuf>,
    pub irradiance_path: Option<PathBuf>,
    pub radiance_path: Option<PathBuf>,
    pub brdf_lut_path: Option<PathBuf>,

    pub pbr: bool,
    pub multithreaded: bool,
    pub wireframe: bool,
    pub print_fps: bool,

    pub model_spin_speed: f32,
    pub skybox_scale: f32,
    pub camera_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        return Self {
            width: 800,
            height: 600,
            title: String::from("3D Rasterizer"),
            fps: 60.0,
            tile_size: 32,
            workers: 0,
            fov_vertical: std::f32::consts::FRAC_PI_3,
            near: 0.01,
            far: 1000.0,
            model_path: PathBuf::from("assets/model.obj"),
            texture_path: PathBuf::from("assets/model.png"),
            skybox_path: Some(PathBuf::from("assets/skybox.obj")),
            skybox_texture_path: Some(PathBuf::from("assets/skybox.png")),
            irradiance_path: Some(PathBuf::from("assets/ibl/irradiance.png")),
            radiance_path: Some(PathBuf::from("assets/ibl/radiance.png")),
            brdf_lut_path: Some(PathBuf::from("assets/ibl/lut.png")),
            pbr: true,
            multithreaded: true,
            wireframe: false,
            print_fps: false,
            model_spin_speed: 0.5,
            skybox_scale: 500.0,
            camera_speed: 2.0,
            mouse_sensitivity: 0.001,
        };
    }
}

impl RenderConfig {
    /// Reads a TOML file, fields missing from it keep their defaults.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        return Self::from_toml(&contents);
    }

    pub fn from_toml(contents: &str) -> Result<Self, RenderError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| RenderError::Config(e.to_string()))?;
        config.validate()?;
        return Ok(config);
    }

    fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::Config(format!(
                "frame size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.tile_size == 0 {
            return Err(RenderError::Config(String::from("tile_size must be positive")));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(RenderError::Config(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        if self.fps <= 0.0 {
            return Err(RenderError::Config(String::from("fps must be positive")));
        }
        return Ok(());
    }

    pub fn aspect_ratio(&self) -> f32 {
        return self.width as f32 / self.height as f32;
    }

    /// Target duration of a frame in milliseconds.
    pub fn frame_target_ms(&self) -> f32 {
        return 1000.0 / self.fps;
    }

    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        return std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
    }
}
