use nalgebra as na;
use na::{Vector2, Vector3, Vector4};

use crate::math::normalize_or_zero;

/// Upper bound of vertices a clipped triangle can reach, six planes add at most one each.
pub const MAX_POLYGON_VERTICES: usize = 10;

/// Render primitive produced fresh every frame.
///
/// `vertices` hold clip space positions until the perspective divide, afterwards
/// x and y are pixel coordinates, z is normalized depth and w keeps the clip w.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector4<f32>; 3],
    pub view_positions: [Vector3<f32>; 3],
    pub normals: [Vector3<f32>; 3],
    pub uvs: [Vector2<f32>; 3],
    pub colors: [u32; 3],
}

/// Attributes of one covered pixel after perspective-correct interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    /// Interpolated 1/w, larger is closer.
    pub inv_w: f32,
    pub uv: Vector2<f32>,
    pub view_position: Vector3<f32>,
    /// Unit length unless every vertex normal was zero.
    pub normal: Vector3<f32>,
}

impl Triangle {
    /// Perspective-correct interpolation at barycentric `weights` (one per vertex, summing to one).
    /// Attributes divided by w are blended linearly, then divided by the blended 1/w.
    pub fn interpolate(&self, weights: Vector3<f32>) -> Fragment {
        let inv_ws = self.vertices.map(|v| 1.0 / v.w);
        let inv_w = weights.x * inv_ws[0] + weights.y * inv_ws[1] + weights.z * inv_ws[2];
        let k = [weights.x * inv_ws[0], weights.y * inv_ws[1], weights.z * inv_ws[2]];

        let uv = (self.uvs[0] * k[0] + self.uvs[1] * k[1] + self.uvs[2] * k[2]) / inv_w;
        let view_position = (self.view_positions[0] * k[0]
            + self.view_positions[1] * k[1]
            + self.view_positions[2] * k[2])
            / inv_w;
        let normal = (self.normals[0] * k[0] + self.normals[1] * k[1] + self.normals[2] * k[2]) / inv_w;

        return Fragment {
            inv_w,
            uv,
            view_position,
            normal: normalize_or_zero(normal),
        };
    }
}

/// Vertex carried through clipping, everything the rasterizer later interpolates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub position: Vector4<f32>,
    pub uv: Vector2<f32>,
    pub view_position: Vector3<f32>,
    pub normal: Vector3<f32>,
}

impl ClipVertex {
    pub fn lerp(&self, other: &ClipVertex, t: f32) -> ClipVertex {
        return ClipVertex {
            position: self.position + (other.position - self.position) * t,
            uv: self.uv + (other.uv - self.uv) * t,
            view_position: self.view_position + (other.view_position - self.view_position) * t,
            normal: self.normal + (other.normal - self.normal) * t,
        };
    }
}

/// Convex polygon in clip space with a fixed vertex budget, no heap involved.
#[derive(Debug, Clone, Copy)]
pub struct Polygon {
    vertices: [ClipVertex; MAX_POLYGON_VERTICES],
    len: usize,
    /// Flat color inherited by every triangle cut from this polygon.
    pub color: u32,
}

impl Polygon {
    pub fn from_triangle(triangle: &Triangle) -> Self {
        let empty = ClipVertex {
            position: Vector4::zeros(),
            uv: Vector2::zeros(),
            view_position: Vector3::zeros(),
            normal: Vector3::zeros(),
        };
        let mut polygon = Self {
            vertices: [empty; MAX_POLYGON_VERTICES],
            len: 0,
            color: triangle.colors[0],
        };
        for i in 0..3 {
            polygon.push(ClipVertex {
                position: triangle.vertices[i],
                uv: triangle.uvs[i],
                view_position: triangle.view_positions[i],
                normal: triangle.normals[i],
            });
        }
        return polygon;
    }

    /// Empty polygon sharing the vertex storage type, used as a clipping scratch buffer.
    pub fn cleared(&self) -> Self {
        let mut polygon = *self;
        polygon.len = 0;
        return polygon;
    }

    /// Appends a vertex. Clipping never exceeds the bound, a vertex past it is dropped.
    pub fn push(&mut self, vertex: ClipVertex) {
        debug_assert!(self.len < MAX_POLYGON_VERTICES, "polygon vertex budget exceeded");
        if self.len < MAX_POLYGON_VERTICES {
            self.vertices[self.len] = vertex;
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        return &self.vertices[..self.len];
    }
}
