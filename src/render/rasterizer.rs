//! Edge function triangle fill shared by the full-frame and the tiled renderers.

use nalgebra as na;
use na::{vector, Vector2, Vector3};

use super::buffer::{PixelTarget, TileRect};
use super::shading;
use super::triangle::Triangle;
use super::{Material, SceneInfo};
use crate::color;
use crate::math::{cross_2d, xy};

/// Offset applied to edges that do not own the pixels lying exactly on them.
const FILL_BIAS: f32 = -0.0001;

/// Top-left rule: flat top edges and left edges keep pixels centred on them.
fn is_top_flat_or_left(edge: Vector2<f32>) -> bool {
    let is_top_flat = edge.y == 0.0 && edge.x > 0.0;
    let is_left = edge.y < 0.0;
    return is_top_flat || is_left;
}

fn fill_bias(edge: Vector2<f32>) -> f32 {
    if is_top_flat_or_left(edge) {
        return 0.0;
    }
    return FILL_BIAS;
}

/// Inclusive pixel bounds of the triangle clipped to `rect`, `None` when they miss it.
fn bounding_box(vertices: &[Vector2<f32>; 3], rect: TileRect) -> Option<(u32, u32, u32, u32)> {
    if rect.x1 <= rect.x0 || rect.y1 <= rect.y0 {
        return None;
    }
    let min_x = vertices[0].x.min(vertices[1].x).min(vertices[2].x).floor();
    let min_y = vertices[0].y.min(vertices[1].y).min(vertices[2].y).floor();
    let max_x = vertices[0].x.max(vertices[1].x).max(vertices[2].x).floor();
    let max_y = vertices[0].y.max(vertices[1].y).max(vertices[2].y).floor();
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }

    let x_min = min_x.max(rect.x0 as f32);
    let y_min = min_y.max(rect.y0 as f32);
    let x_max = max_x.min((rect.x1 - 1) as f32);
    let y_max = max_y.min((rect.y1 - 1) as f32);
    if x_min > x_max || y_min > y_max {
        return None;
    }
    return Some((x_min as u32, y_min as u32, x_max as u32, y_max as u32));
}

/// Fills one screen space triangle into `target`, restricted to `target.rect()`.
///
/// Attributes are interpolated perspective-correctly, the texel is shaded with the
/// evaluator the material asks for and the pixel is kept only if its 1/w beats the
/// stored depth. Returns the number of pixels written.
pub fn rasterize_triangle<T: PixelTarget>(
    triangle: &Triangle,
    material: &Material,
    scene: &SceneInfo,
    target: &mut T,
) -> u32 {
    let [v0, v1, v2] = triangle.vertices.map(xy);

    let v0v1 = v1 - v0;
    let v1v2 = v2 - v1;
    let v2v0 = v0 - v2;

    // Culling already removed back faces, what is left with no positive area covers nothing.
    let area = cross_2d(v0v1, v2 - v0);
    if !(area > 0.0) {
        return 0;
    }

    let (x_min, y_min, x_max, y_max) = match bounding_box(&[v0, v1, v2], target.rect()) {
        Some(bounds) => bounds,
        None => return 0,
    };

    let bias0 = fill_bias(v0v1);
    let bias1 = fill_bias(v1v2);
    let bias2 = fill_bias(v2v0);

    let mut written = 0;
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            // Evaluated per pixel, so coverage never depends on where the target rectangle starts.
            let p = vector![x as f32 + 0.5, y as f32 + 0.5];
            let w0 = cross_2d(v0v1, p - v0) + bias0;
            let w1 = cross_2d(v1v2, p - v1) + bias1;
            let w2 = cross_2d(v2v0, p - v2) + bias2;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let weights = vector![w1 / area, w2 / area, w0 / area];
            let fragment = triangle.interpolate(weights);
            if fragment.inv_w > target.depth(x, y) {
                let color = shade(fragment.uv, fragment.view_position, fragment.normal, material, scene);
                target.put(x, y, color, fragment.inv_w);
                written += 1;
            }
        }
    }
    return written;
}

fn shade(
    uv: Vector2<f32>,
    position: Vector3<f32>,
    normal: Vector3<f32>,
    material: &Material,
    scene: &SceneInfo,
) -> u32 {
    if material.pbr {
        if let Some(irradiance) = material.irradiance {
            let environment = shading::sample_cubemap(irradiance, normal);
            return shading::pbr(position, normal, scene.camera_position, scene.lights, environment);
        }
    }
    let texel = material.albedo.sample(uv.x, uv.y);
    return shading::phong(position, normal, scene.camera_position, scene.lights, texel);
}

/// Digital differential analyzer line, plotted without depth test and cut to the target rectangle.
pub fn draw_line<T: PixelTarget>(from: Vector2<f32>, to: Vector2<f32>, color: u32, target: &mut T) {
    let delta = to - from;
    let longest_side = delta.x.abs().max(delta.y.abs());
    if longest_side == 0.0 || !longest_side.is_finite() {
        return;
    }
    let increment = delta / longest_side;
    let rect = target.rect();

    let mut current = from;
    for _ in 0..longest_side.ceil() as u32 {
        if current.x >= 0.0 && current.y >= 0.0 {
            let (x, y) = (current.x as u32, current.y as u32);
            if rect.contains(x, y) {
                target.put_color(x, y, color);
            }
        }
        current += increment;
    }
}

/// White outline of a triangle's three edges.
pub fn draw_wireframe<T: PixelTarget>(triangle: &Triangle, target: &mut T) {
    let [v0, v1, v2] = triangle.vertices.map(xy);
    draw_line(v0, v1, color::WHITE, target);
    draw_line(v1, v2, color::WHITE, target);
    draw_line(v2, v0, color::WHITE, target);
}
