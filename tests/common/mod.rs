#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use nalgebra as na;
use na::{Matrix4, Vector2, Vector3, Vector4};

use tiled_rasterizer::color;
use tiled_rasterizer::math::{look_at, perspective};
use tiled_rasterizer::render::triangle::Triangle;
use tiled_rasterizer::scene::mesh::Mesh;
use tiled_rasterizer::scene::texture::Texture;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

/// Unit cube, 8 corners and 12 faces wound counter-clockwise seen from outside.
pub const CUBE_OBJ: &str = "\
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 -1
vn 0 0 1
vn -1 0 0
vn 1 0 0
vn 0 -1 0
vn 0 1 0
f 1/1/1 4/2/1 3/3/1
f 1/1/1 3/3/1 2/4/1
f 5/1/2 6/2/2 7/3/2
f 5/1/2 7/3/2 8/4/2
f 1/1/3 5/2/3 8/3/3
f 1/1/3 8/3/3 4/4/3
f 2/1/4 3/2/4 7/3/4
f 2/1/4 7/3/4 6/4/4
f 1/1/5 2/2/5 6/3/5
f 1/1/5 6/3/5 5/4/5
f 4/1/6 8/2/6 7/3/6
f 4/1/6 7/3/6 3/4/6
";

pub fn gray_texture() -> Arc<Texture> {
    return Arc::new(Texture::solid(color::pack(0xFF, 128, 128, 128)));
}

pub fn obj_cube() -> Mesh {
    return Mesh::from_obj_reader(CUBE_OBJ.as_bytes(), Path::new("cube.obj"), gray_texture())
        .expect("cube fixture parses");
}

pub fn projection() -> Matrix4<f32> {
    return perspective(std::f32::consts::FRAC_PI_3, WIDTH as f32 / HEIGHT as f32, 0.01, 1000.0);
}

pub fn view_from(eye: Vector3<f32>) -> Matrix4<f32> {
    return look_at(eye, Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));
}

/// Screen space triangle at constant clip w, facing the camera.
pub fn screen_triangle(corners: [(f32, f32); 3], w: f32) -> Triangle {
    return Triangle {
        vertices: corners.map(|(x, y)| Vector4::new(x, y, 0.5, w)),
        view_positions: [Vector3::new(0.0, 0.0, w); 3],
        normals: [Vector3::new(0.0, 0.0, -1.0); 3],
        uvs: [Vector2::zeros(); 3],
        colors: [color::WHITE; 3],
    };
}
