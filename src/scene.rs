pub mod camera;
pub mod light;
pub mod mesh;
pub mod texture;

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use nalgebra as na;
use na::{vector, Matrix4, Vector3};

use crate::color;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::input::InputState;
use crate::math::perspective;
use crate::render::geometry::{project_mesh, Transform};
use crate::render::triangle::Triangle;
use crate::render::{MaterialTextures, SceneMaterials};
use camera::Camera;
use light::{Light, Lights};
use mesh::Mesh;
use texture::Texture;

/// Output of the geometry stage for one frame, consumed by the renderer.
/// Lights and camera are already in view space, so the camera sits at the origin.
#[derive(Debug, Clone, Default)]
pub struct FrameGeometry {
    pub triangles: Vec<Triangle>,
    pub skybox_triangles: Vec<Triangle>,
    pub lights: Lights,
    pub camera_position: Vector3<f32>,
    /// Model faces that survived back-face culling, before clipping.
    pub visible_faces: usize,
}

impl FrameGeometry {
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.skybox_triangles.clear();
        self.lights = Lights::new();
        self.camera_position = Vector3::zeros();
        self.visible_faces = 0;
    }
}

/// Everything that is drawn: the spinning model, the optional skybox with its
/// image based lighting maps, the lights and the camera.
pub struct Scene {
    pub model: Mesh,
    pub model_transform: Transform,
    pub model_spin_speed: f32,
    pub skybox: Option<Mesh>,
    pub skybox_scale: f32,
    pub irradiance: Option<Arc<Texture>>,
    pub radiance: Option<Arc<Texture>>,
    pub brdf_lut: Option<Arc<Texture>>,
    pub lights: Lights,
    pub camera: Camera,
    pub projection: Matrix4<f32>,
    pub width: u32,
    pub height: u32,
}

impl Scene {
    /// Scene around `model` with the default light rig: one white light above the origin.
    pub fn new(model: Mesh, config: &RenderConfig) -> Self {
        let mut lights = Lights::new();
        lights.push(Light { position: vector![0.0, 5.0, 0.0], color: color::WHITE });
        return Self {
            model,
            model_transform: Transform::default(),
            model_spin_speed: config.model_spin_speed,
            skybox: None,
            skybox_scale: config.skybox_scale,
            irradiance: None,
            radiance: None,
            brdf_lut: None,
            lights,
            camera: Camera::new(config.camera_speed, config.mouse_sensitivity),
            projection: perspective(config.fov_vertical, config.aspect_ratio(), config.near, config.far),
            width: config.width,
            height: config.height,
        };
    }

    /// Loads the model and every optional asset named by `config`.
    /// The model is required, optional assets whose file is missing are skipped.
    pub fn load(config: &RenderConfig) -> Result<Self, RenderError> {
        let model = Mesh::load(&config.model_path, &config.texture_path)?;
        let mut scene = Self::new(model, config);

        if let (Some(mesh_path), Some(texture_path)) = (&config.skybox_path, &config.skybox_texture_path) {
            if mesh_path.exists() && texture_path.exists() {
                scene.skybox = Some(Mesh::load(mesh_path, texture_path)?);
            } else {
                warn!("Skybox assets not found, drawing without background");
            }
        }
        scene.irradiance = load_optional_texture(config.irradiance_path.as_deref())?;
        // Radiance and the BRDF table ride along in the materials, shading samples only irradiance.
        scene.radiance = load_optional_texture(config.radiance_path.as_deref())?;
        scene.brdf_lut = load_optional_texture(config.brdf_lut_path.as_deref())?;
        if config.pbr && scene.irradiance.is_none() {
            warn!("No irradiance map, physically based shading falls back to Phong");
        }

        info!(
            "Scene ready: {} model faces, skybox {}, {} light(s)",
            scene.model.faces.len(),
            if scene.skybox.is_some() { "on" } else { "off" },
            scene.lights.len()
        );
        return Ok(scene);
    }

    /// Texture bindings for both passes. The skybox is always Phong shaded.
    pub fn materials(&self, pbr: bool) -> SceneMaterials {
        let model = MaterialTextures {
            albedo: Arc::clone(&self.model.texture),
            irradiance: self.irradiance.clone(),
            radiance: self.radiance.clone(),
            brdf_lut: self.brdf_lut.clone(),
            pbr,
        };
        let skybox = self
            .skybox
            .as_ref()
            .map(|mesh| MaterialTextures::phong(Arc::clone(&mesh.texture)));
        return SceneMaterials { model, skybox };
    }

    /// Advances animation and camera by `dt` seconds, then rebuilds `geometry`.
    pub fn update(&mut self, input: &InputState, dt: f32, geometry: &mut FrameGeometry) {
        self.model_transform.rotation.y += self.model_spin_speed * dt;
        self.camera.update(input, dt);
        self.build_geometry(geometry);
    }

    /// Projects the model and the skybox for the current camera without animating anything.
    pub fn build_geometry(&self, geometry: &mut FrameGeometry) {
        geometry.clear();
        let view = self.camera.view_matrix();

        geometry.visible_faces = project_mesh(
            &self.model,
            &self.model_transform,
            &view,
            &self.projection,
            self.width,
            self.height,
            false,
            &mut geometry.triangles,
        );

        if let Some(skybox) = &self.skybox {
            let transform = Transform {
                scale: Vector3::repeat(self.skybox_scale),
                rotation: Vector3::zeros(),
                translation: self.camera.position,
            };
            project_mesh(
                skybox,
                &transform,
                &view,
                &self.projection,
                self.width,
                self.height,
                true,
                &mut geometry.skybox_triangles,
            );
        }

        geometry.lights = self.lights.to_view_space(&view);
        geometry.camera_position = Vector3::zeros();
        debug!(
            "Geometry: {} visible faces, {} triangles, {} skybox triangles",
            geometry.visible_faces,
            geometry.triangles.len(),
            geometry.skybox_triangles.len()
        );
    }
}

fn load_optional_texture(path: Option<&Path>) -> Result<Option<Arc<Texture>>, RenderError> {
    let path = match path {
        Some(path) => path,
        None => return Ok(None),
    };
    if !path.exists() {
        warn!("Texture {} not found, skipping", path.display());
        return Ok(None);
    }
    return Ok(Some(Arc::new(Texture::load(path)?)));
}
