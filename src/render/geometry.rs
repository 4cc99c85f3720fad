use nalgebra as na;
use na::{vector, Matrix4, Vector3, Vector4};

use super::clipping::{clip_polygon, triangulate};
use super::triangle::{Polygon, Triangle};
use crate::math::{
    from_hom, normalize_or_zero, rotation_x, rotation_y, rotation_z, scale, to_hom_point, to_hom_vector,
    translation,
};
use crate::scene::mesh::Mesh;

/// Clip space depth given to background geometry so that it never fails the near or far test.
pub const SKYBOX_DEPTH: f32 = 1e-4;

/// Model placement: scaled first, then rotated (x, then y, then z), then translated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f32>,
    /// Euler angles in radians.
    pub rotation: Vector3<f32>,
    pub translation: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        return Self {
            scale: vector![1.0, 1.0, 1.0],
            rotation: Vector3::zeros(),
            translation: Vector3::zeros(),
        };
    }
}

impl Transform {
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        return rotation_z(self.rotation.z) * rotation_y(self.rotation.y) * rotation_x(self.rotation.x);
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        let t = self.translation;
        let s = self.scale;
        return translation(t.x, t.y, t.z) * self.rotation_matrix() * scale(s.x, s.y, s.z);
    }
}

/// View space back-face test, the camera sits at the origin.
/// A face is kept when its edge cross product points away from the camera.
pub fn is_back_face(view_positions: &[Vector3<f32>; 3]) -> bool {
    let [a, b, c] = view_positions;
    let ab = b - a;
    let ac = c - a;
    let normal = ac.cross(&ab);
    let camera_ray = -a;
    return normal.dot(&camera_ray) < 0.0;
}

/// Perspective divide followed by the NDC to pixel mapping. `w` is kept for interpolation.
pub fn to_screen(triangle: &mut Triangle, width: u32, height: u32) {
    for vertex in triangle.vertices.iter_mut() {
        let w = vertex.w;
        let ndc = vector![vertex.x / w, vertex.y / w, vertex.z / w];
        *vertex = Vector4::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (ndc.y + 1.0) * 0.5 * height as f32,
            ndc.z,
            w,
        );
    }
}

/// Runs every face of `mesh` through transform, cull, projection, clipping and the
/// viewport mapping, appending the screen space triangles to `out`.
/// Returns how many faces survived back-face culling.
pub fn project_mesh(
    mesh: &Mesh,
    transform: &Transform,
    view_matrix: &Matrix4<f32>,
    projection_matrix: &Matrix4<f32>,
    width: u32,
    height: u32,
    is_skybox: bool,
    out: &mut Vec<Triangle>,
) -> usize {
    out.reserve(mesh.faces.len());
    let model_rotation = transform.rotation_matrix();
    let model_view = view_matrix * transform.model_matrix();
    // Normals only see rotations, translation never touches a direction.
    let normal_matrix = view_matrix * model_rotation;

    let mut visible = 0;
    for face in &mesh.faces {
        let view_positions = face.positions.map(|i| from_hom(model_view * to_hom_point(mesh.vertices[i])));
        if is_back_face(&view_positions) {
            continue;
        }
        visible += 1;

        let normals = face
            .normals
            .map(|i| normalize_or_zero(from_hom(normal_matrix * to_hom_vector(mesh.normals[i]))));
        let vertices = view_positions.map(|p| {
            let mut clip = projection_matrix * to_hom_point(p);
            if is_skybox {
                clip.z = SKYBOX_DEPTH;
            }
            clip
        });
        let triangle = Triangle {
            vertices,
            view_positions,
            normals,
            uvs: face.uvs.map(|i| mesh.tex_coords[i]),
            colors: [face.color; 3],
        };

        let mut polygon = Polygon::from_triangle(&triangle);
        clip_polygon(&mut polygon);
        let first_new = out.len();
        triangulate(&polygon, out);
        for triangle in out[first_new..].iter_mut() {
            to_screen(triangle, width, height);
        }
    }
    return visible;
}
