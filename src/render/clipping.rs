//! Sutherland-Hodgman clipping in homogeneous clip space.

use nalgebra::Vector4;

use super::triangle::{Polygon, Triangle};

/// One frustum boundary. `distance` is non-negative exactly on the inside,
/// so both the inside test and the edge intersection factor derive from it.
#[derive(Clone, Copy)]
pub struct ClipPlane {
    pub name: &'static str,
    distance: fn(&Vector4<f32>) -> f32,
}

impl ClipPlane {
    pub fn distance(&self, v: &Vector4<f32>) -> f32 {
        return (self.distance)(v);
    }

    pub fn inside(&self, v: &Vector4<f32>) -> bool {
        return self.distance(v) >= 0.0;
    }

    /// Factor `t` along `from -> to` where the edge meets the plane.
    pub fn intersection(&self, from: &Vector4<f32>, to: &Vector4<f32>) -> f32 {
        let d_from = self.distance(from);
        let d_to = self.distance(to);
        return d_from / (d_from - d_to);
    }
}

/// Planes in the order polygons are clipped against them.
pub const CLIP_PLANES: [ClipPlane; 6] = [
    ClipPlane { name: "top", distance: |v| v.w - v.y },
    ClipPlane { name: "bottom", distance: |v| v.w + v.y },
    ClipPlane { name: "left", distance: |v| v.w + v.x },
    ClipPlane { name: "right", distance: |v| v.w - v.x },
    ClipPlane { name: "near", distance: |v| v.w + v.z },
    ClipPlane { name: "far", distance: |v| v.w - v.z },
];

/// Clips a polygon against a single plane in place.
pub fn clip_against_plane(polygon: &mut Polygon, plane: &ClipPlane) {
    if polygon.is_empty() {
        return;
    }
    let mut clipped = polygon.cleared();
    let vertices = polygon.vertices();
    let mut previous = vertices[vertices.len() - 1];
    let mut previous_inside = plane.inside(&previous.position);
    for &current in vertices {
        let current_inside = plane.inside(&current.position);
        if previous_inside != current_inside {
            let t = plane.intersection(&previous.position, &current.position);
            clipped.push(previous.lerp(&current, t));
        }
        if current_inside {
            clipped.push(current);
        }
        previous = current;
        previous_inside = current_inside;
    }
    *polygon = clipped;
}

/// Clips against all six frustum planes, each pass feeding the next.
pub fn clip_polygon(polygon: &mut Polygon) {
    for plane in CLIP_PLANES.iter() {
        clip_against_plane(polygon, plane);
    }
}

/// Fan triangulation around vertex 0, `n` vertices give `n - 2` triangles.
pub fn triangulate(polygon: &Polygon, out: &mut Vec<Triangle>) {
    let vertices = polygon.vertices();
    if vertices.len() < 3 {
        return;
    }
    for i in 0..vertices.len() - 2 {
        let corners = [vertices[0], vertices[i + 1], vertices[i + 2]];
        out.push(Triangle {
            vertices: corners.map(|v| v.position),
            view_positions: corners.map(|v| v.view_position),
            normals: corners.map(|v| v.normal),
            uvs: corners.map(|v| v.uv),
            colors: [polygon.color; 3],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;
    use crate::math::{cross_2d, xy};
    use crate::render::triangle::MAX_POLYGON_VERTICES;
    use nalgebra::{vector, Vector2, Vector3};

    fn clip_triangle(a: Vector4<f32>, b: Vector4<f32>, c: Vector4<f32>) -> Triangle {
        return Triangle {
            vertices: [a, b, c],
            view_positions: [Vector3::zeros(); 3],
            normals: [Vector3::z(); 3],
            uvs: [vector![0.0, 0.0], vector![1.0, 0.0], vector![0.0, 1.0]],
            colors: [WHITE; 3],
        };
    }

    fn polygon_area(points: &[Vector2<f32>]) -> f32 {
        let mut doubled = 0.0;
        for i in 0..points.len() {
            doubled += cross_2d(points[i], points[(i + 1) % points.len()]);
        }
        return doubled.abs() / 2.0;
    }

    #[test]
    fn inside_triangle_is_untouched() {
        let triangle = clip_triangle(
            vector![-0.5, -0.5, 0.1, 1.0],
            vector![0.5, -0.5, 0.2, 1.0],
            vector![0.0, 0.5, 0.3, 1.0],
        );
        let mut polygon = Polygon::from_triangle(&triangle);
        clip_polygon(&mut polygon);
        let mut out = Vec::new();
        triangulate(&polygon, &mut out);
        assert_eq!(out, vec![triangle]);
    }

    #[test]
    fn new_vertices_lie_on_the_crossed_plane() {
        for plane in CLIP_PLANES.iter() {
            // One corner pushed far outside along the plane's axis.
            let outside = match plane.name {
                "top" => vector![0.0, 3.0, 0.0, 1.0],
                "bottom" => vector![0.0, -3.0, 0.0, 1.0],
                "left" => vector![-3.0, 0.0, 0.0, 1.0],
                "right" => vector![3.0, 0.0, 0.0, 1.0],
                "near" => vector![0.0, 0.0, -3.0, 1.0],
                _ => vector![0.0, 0.0, 3.0, 1.0],
            };
            let triangle = clip_triangle(outside, vector![0.2, 0.1, 0.1, 1.0], vector![-0.1, -0.2, -0.1, 1.0]);
            let mut polygon = Polygon::from_triangle(&triangle);
            clip_against_plane(&mut polygon, plane);
            assert_eq!(polygon.len(), 4, "plane {}", plane.name);
            let on_plane = polygon
                .vertices()
                .iter()
                .filter(|v| !triangle.vertices.contains(&v.position))
                .collect::<Vec<_>>();
            assert_eq!(on_plane.len(), 2, "plane {}", plane.name);
            for vertex in on_plane {
                assert!(plane.distance(&vertex.position).abs() < 1e-5, "plane {}", plane.name);
            }
        }
    }

    #[test]
    fn uvs_follow_the_clipped_edge() {
        let triangle = clip_triangle(
            vector![-0.5, 0.0, 0.0, 1.0],
            vector![3.5, 0.0, 0.0, 1.0],
            vector![-0.5, 0.5, 0.0, 1.0],
        );
        let mut polygon = Polygon::from_triangle(&triangle);
        clip_against_plane(&mut polygon, &CLIP_PLANES[3]);
        // x = 1 is reached at three eighths of the way from the first to the second corner.
        let cut = polygon
            .vertices()
            .iter()
            .find(|v| v.position.y == 0.0 && v.position.x == 1.0)
            .map(|v| v.uv);
        assert_eq!(cut, Some(vector![0.375, 0.0]));
    }

    #[test]
    fn fully_outside_triangle_disappears() {
        let triangle = clip_triangle(
            vector![2.0, 2.0, 0.0, 1.0],
            vector![3.0, 2.0, 0.0, 1.0],
            vector![2.5, 3.0, 0.0, 1.0],
        );
        let mut polygon = Polygon::from_triangle(&triangle);
        clip_polygon(&mut polygon);
        assert!(polygon.is_empty());
        let mut out = Vec::new();
        triangulate(&polygon, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn fan_keeps_count_and_area() {
        // Large triangle cut by all four side planes.
        let triangle = clip_triangle(
            vector![-4.0, -3.0, 0.0, 1.0],
            vector![4.0, -3.5, 0.0, 1.0],
            vector![0.5, 5.0, 0.0, 1.0],
        );
        let mut polygon = Polygon::from_triangle(&triangle);
        clip_polygon(&mut polygon);
        let n = polygon.len();
        assert!(n > 3 && n < MAX_POLYGON_VERTICES);

        let mut out = Vec::new();
        triangulate(&polygon, &mut out);
        assert_eq!(out.len(), n - 2);

        let outline: Vec<Vector2<f32>> = polygon.vertices().iter().map(|v| xy(v.position)).collect();
        let fan_area: f32 = out
            .iter()
            .map(|t| polygon_area(&t.vertices.map(xy)))
            .sum();
        assert!((fan_area - polygon_area(&outline)).abs() < 1e-4);
        // The visible square is completely covered.
        assert!((fan_area - 4.0).abs() < 1e-4);
    }
}
