//! CPU triangle rasterizer: OBJ meshes go through a clip space pipeline and are
//! filled tile by tile by a pool of worker threads, with Phong or physically
//! based shading evaluated per pixel.

pub mod app;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod math;
pub mod render;
pub mod scene;
