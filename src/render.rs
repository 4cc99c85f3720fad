pub mod buffer;
pub mod clipping;
pub mod geometry;
pub mod rasterizer;
pub mod shading;
pub mod tiles;
pub mod triangle;

use std::sync::Arc;

use log::debug;
use nalgebra::Vector3;

use crate::color;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::scene::light::Light;
use crate::scene::texture::Texture;
use crate::scene::FrameGeometry;
use buffer::{FrameBuffer, PixelTarget};
use rasterizer::{draw_wireframe, rasterize_triangle};
use tiles::{FrameStats, TileGrid, WorkerPool};
use triangle::Triangle;

/// Triangles of one frame bound to the textures they are shaded with.
/// Borrowed for the duration of a frame only.
#[derive(Clone, Copy)]
pub struct Material<'a> {
    pub triangles: &'a [Triangle],
    pub albedo: &'a Texture,
    pub irradiance: Option<&'a Texture>,
    pub radiance: Option<&'a Texture>,
    pub brdf_lut: Option<&'a Texture>,
    /// Shade with the physically based evaluator when an irradiance map is present.
    pub pbr: bool,
}

/// Per-frame shading inputs shared by every triangle, all in view space.
#[derive(Clone, Copy)]
pub struct SceneInfo<'a> {
    pub lights: &'a [Light],
    pub camera_position: Vector3<f32>,
}

/// Owned texture handles of a material, cheap to clone into render jobs.
#[derive(Debug, Clone)]
pub struct MaterialTextures {
    pub albedo: Arc<Texture>,
    pub irradiance: Option<Arc<Texture>>,
    pub radiance: Option<Arc<Texture>>,
    pub brdf_lut: Option<Arc<Texture>>,
    pub pbr: bool,
}

impl MaterialTextures {
    /// Material without image based lighting, shaded with Phong.
    pub fn phong(albedo: Arc<Texture>) -> Self {
        return Self { albedo, irradiance: None, radiance: None, brdf_lut: None, pbr: false };
    }

    pub fn bind<'a>(&'a self, triangles: &'a [Triangle]) -> Material<'a> {
        return Material {
            triangles,
            albedo: &self.albedo,
            irradiance: self.irradiance.as_deref(),
            radiance: self.radiance.as_deref(),
            brdf_lut: self.brdf_lut.as_deref(),
            pbr: self.pbr,
        };
    }
}

#[derive(Debug, Clone)]
pub struct SceneMaterials {
    pub model: MaterialTextures,
    /// `None` skips the background pass.
    pub skybox: Option<MaterialTextures>,
}

/// Everything a worker needs to draw any tile of one frame.
#[derive(Clone)]
struct FrameJob {
    geometry: FrameGeometry,
    materials: SceneMaterials,
    wireframe: bool,
}

impl FrameJob {
    fn draw<T: PixelTarget>(&self, target: &mut T) -> u64 {
        return draw_frame(&self.geometry, &self.materials, self.wireframe, target);
    }
}

/// Opaque geometry first, then the skybox behind it, then the optional outline.
fn draw_frame<T: PixelTarget>(
    geometry: &FrameGeometry,
    materials: &SceneMaterials,
    wireframe: bool,
    target: &mut T,
) -> u64 {
    let scene = SceneInfo {
        lights: geometry.lights.as_slice(),
        camera_position: geometry.camera_position,
    };

    let mut written = 0u64;
    let mut passes = vec![materials.model.bind(&geometry.triangles)];
    if let Some(skybox) = &materials.skybox {
        passes.push(skybox.bind(&geometry.skybox_triangles));
    }
    for material in &passes {
        for triangle in material.triangles {
            written += rasterize_triangle(triangle, material, &scene, target) as u64;
        }
    }

    if wireframe {
        for triangle in &geometry.triangles {
            draw_wireframe(triangle, target);
        }
    }
    return written;
}

/// Owns the frame buffer and, when running multithreaded, the worker pool.
pub struct Renderer {
    frame: FrameBuffer,
    grid: TileGrid,
    pool: Option<WorkerPool>,
    pub wireframe: bool,
    pub clear_color: u32,
}

impl Renderer {
    /// `workers` of `None` renders everything on the calling thread.
    pub fn new(width: u32, height: u32, tile_size: u32, workers: Option<usize>) -> Self {
        return Self {
            frame: FrameBuffer::new(width, height),
            grid: TileGrid::new(width, height, tile_size),
            pool: workers.map(WorkerPool::new),
            wireframe: false,
            clear_color: color::BLACK,
        };
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        let workers = if config.multithreaded { Some(config.worker_count()) } else { None };
        let mut renderer = Self::new(config.width, config.height, config.tile_size, workers);
        renderer.wireframe = config.wireframe;
        return renderer;
    }

    pub fn frame(&self) -> &FrameBuffer {
        return &self.frame;
    }

    pub fn grid(&self) -> &TileGrid {
        return &self.grid;
    }

    pub fn is_multithreaded(&self) -> bool {
        return self.pool.is_some();
    }

    fn begin_frame(&mut self) {
        self.frame.clear(self.clear_color);
        self.frame.clear_depth();
    }

    /// Renders with the worker pool when there is one, otherwise on this thread.
    pub fn render(
        &mut self,
        geometry: &mut FrameGeometry,
        materials: &SceneMaterials,
    ) -> Result<FrameStats, RenderError> {
        if self.pool.is_some() {
            return self.render_tiled(geometry, materials);
        }
        return Ok(self.render_single_threaded(geometry, materials));
    }

    /// Draws every triangle over the whole frame from the calling thread.
    pub fn render_single_threaded(&mut self, geometry: &FrameGeometry, materials: &SceneMaterials) -> FrameStats {
        self.begin_frame();
        let pixels_written = draw_frame(geometry, materials, self.wireframe, &mut self.frame);
        let stats = FrameStats {
            tiles_per_worker: vec![self.grid.total()],
            triangles: geometry.triangles.len() + geometry.skybox_triangles.len(),
            pixels_written,
        };
        debug!("Single threaded frame: {} triangles, {} pixels", stats.triangles, stats.pixels_written);
        return stats;
    }

    /// Splits the frame into tiles and lets the pool draw them.
    ///
    /// The geometry is moved into the shared job for the duration of the frame and
    /// handed back afterwards, so the caller's buffers are reused across frames.
    pub fn render_tiled(
        &mut self,
        geometry: &mut FrameGeometry,
        materials: &SceneMaterials,
    ) -> Result<FrameStats, RenderError> {
        let workers = match &self.pool {
            Some(pool) => pool.workers(),
            None => 1,
        };
        if self.pool.is_none() {
            self.pool = Some(WorkerPool::new(workers));
        }
        self.begin_frame();

        let job = Arc::new(FrameJob {
            geometry: std::mem::take(geometry),
            materials: materials.clone(),
            wireframe: self.wireframe,
        });
        let worker_job = Arc::clone(&job);
        let tile_job = Arc::new(move |_worker: usize, _rect: buffer::TileRect, tile: &mut buffer::TileTarget| -> u64 {
            return worker_job.draw(tile);
        });

        let result = match self.pool.as_mut() {
            Some(pool) => pool.dispatch(&mut self.frame, &self.grid, tile_job),
            None => Ok(Vec::new()),
        };
        let job = Arc::try_unwrap(job).unwrap_or_else(|shared| (*shared).clone());
        *geometry = job.geometry;
        let reports = result?;

        let mut tiles_per_worker = vec![0; workers];
        let mut pixels_written = 0;
        for report in &reports {
            if let Some(tiles) = tiles_per_worker.get_mut(report.worker) {
                *tiles = report.tiles;
            }
            pixels_written += report.pixels;
        }
        let stats = FrameStats {
            tiles_per_worker,
            triangles: geometry.triangles.len() + geometry.skybox_triangles.len(),
            pixels_written,
        };
        debug!(
            "Tiled frame: {} triangles, {} pixels, {} tiles",
            stats.triangles,
            stats.pixels_written,
            self.grid.total()
        );
        return Ok(stats);
    }
}
