//! Per-pixel light evaluators. Every input lives in view space.

use std::f32::consts::PI;

use nalgebra as na;
use na::{vector, Vector2, Vector3};

use crate::color;
use crate::math::normalize_or_zero;
use crate::scene::light::Light;
use crate::scene::texture::Texture;

pub const AMBIENT_STRENGTH: f32 = 0.5;
pub const SPECULAR_STRENGTH: f32 = 1.5;
pub const SHININESS: f32 = 32.0;

/// Surface roughness, low values give shiny metal.
pub const ROUGHNESS: f32 = 0.1;
/// Reflectance at normal incidence for common dielectrics.
pub const BASE_REFLECTANCE: f32 = 0.04;
/// Incoming radiance of every light.
pub const LIGHT_INTENSITY: f32 = 1.0;
pub const PBR_AMBIENT_STRENGTH: f32 = 0.02;

const EPSILON: f32 = 1e-7;

fn clamp_cosine(cosine: f32) -> f32 {
    return cosine.clamp(0.0, 1.0);
}

/// Phong reflection, lighting is summed in linear space and gamma encoded afterwards.
pub fn phong(
    position: Vector3<f32>,
    normal: Vector3<f32>,
    camera_position: Vector3<f32>,
    lights: &[Light],
    base_color: u32,
) -> u32 {
    let normal = normalize_or_zero(normal);
    let view_direction = normalize_or_zero(camera_position - position);
    let mut light_total = Vector3::repeat(AMBIENT_STRENGTH);

    for light in lights {
        let light_direction = normalize_or_zero(light.position - position);
        let n_dot_l = normal.dot(&light_direction);
        let reflection = normalize_or_zero(normal * (2.0 * n_dot_l) - light_direction);

        let diffuse = clamp_cosine(n_dot_l);
        let specular = clamp_cosine(view_direction.dot(&reflection)).powf(SHININESS) * SPECULAR_STRENGTH;
        light_total += color::to_unit(light.color) * (diffuse + specular);
    }

    let lit = color::to_linear(base_color).component_mul(&light_total);
    return color::from_linear(color::alpha(base_color), lit);
}

/// Schlick's approximation of the Fresnel reflectance.
pub fn fresnel(half_vector: Vector3<f32>, light_direction: Vector3<f32>) -> f32 {
    let h_dot_l = clamp_cosine(half_vector.dot(&light_direction));
    return BASE_REFLECTANCE + (1.0 - BASE_REFLECTANCE) * (1.0 - h_dot_l).powi(5);
}

/// Hammon's fit of the height correlated Smith visibility term.
pub fn visibility(n_dot_l: f32, n_dot_v: f32) -> f32 {
    let n_dot_l = clamp_cosine(n_dot_l);
    let n_dot_v = clamp_cosine(n_dot_v);
    let lerped = crate::math::lerp(2.0 * n_dot_l * n_dot_v, n_dot_l + n_dot_v, ROUGHNESS);
    return 0.5 / (lerped + EPSILON);
}

/// GGX (Trowbridge-Reitz) normal distribution.
pub fn ggx_distribution(n_dot_h: f32) -> f32 {
    if n_dot_h < 0.0 {
        return 0.0;
    }
    let n_dot_h = clamp_cosine(n_dot_h);
    let alpha_squared = ROUGHNESS * ROUGHNESS;
    let denominator = 1.0 + n_dot_h * n_dot_h * (alpha_squared - 1.0);
    return alpha_squared / (PI * denominator * denominator + EPSILON);
}

/// Cook-Torrance style evaluation. `base_color` is the irradiance sample for the normal.
pub fn pbr(
    position: Vector3<f32>,
    normal: Vector3<f32>,
    camera_position: Vector3<f32>,
    lights: &[Light],
    base_color: u32,
) -> u32 {
    let albedo = color::to_linear(base_color);
    let normal = normalize_or_zero(normal);
    let view_direction = normalize_or_zero(camera_position - position);
    let n_dot_v = normal.dot(&view_direction);
    let mut total = Vector3::zeros();

    for light in lights {
        let light_direction = normalize_or_zero(light.position - position);
        let n_dot_l = normal.dot(&light_direction);
        if n_dot_l <= 0.0 {
            continue;
        }
        let half_vector = normalize_or_zero(light_direction + view_direction);
        let light_color = color::to_unit(light.color);

        let f = fresnel(half_vector, light_direction);
        let specular = f * visibility(n_dot_l, n_dot_v) * ggx_distribution(normal.dot(&half_vector));
        let specular = light_color * specular;
        let diffuse = (albedo / PI).component_mul(&light_color) * (1.0 - f);

        total += (specular + diffuse) * (LIGHT_INTENSITY * clamp_cosine(n_dot_l));
    }

    total += albedo * PBR_AMBIENT_STRENGTH;
    return color::from_linear(color::alpha(base_color), total);
}

/// Maps a direction onto a cube map stored as a 4 x 3 grid of faces.
/// Returns atlas coordinates in [0, 1].
pub fn cubemap_uv(direction: Vector3<f32>) -> Vector2<f32> {
    let abs = direction.abs();
    let mut uv: Vector2<f32>;
    let face: Vector2<f32>;

    if abs.x >= abs.y && abs.x >= abs.z {
        let scale = abs.x.max(EPSILON);
        uv = vector![direction.y, direction.z] / scale;
        if direction.x < 0.0 {
            face = vector![0.0, 1.0];
            uv.y = -uv.y;
        } else {
            face = vector![2.0, 1.0];
            uv = -uv;
        }
    } else if abs.y >= abs.x && abs.y >= abs.z {
        uv = vector![direction.x, direction.z] / abs.y;
        if direction.y < 0.0 {
            face = vector![1.0, 0.0];
            uv.y = -uv.y;
        } else {
            face = vector![1.0, 2.0];
        }
    } else {
        uv = vector![direction.x, direction.y] / abs.z;
        if direction.z < 0.0 {
            face = vector![3.0, 1.0];
            uv = -uv;
        } else {
            face = vector![1.0, 1.0];
            uv.y = -uv.y;
        }
    }

    let uv = (uv + vector![1.0, 1.0]) / 2.0;
    return vector![(uv.x + face.x) / 4.0, (uv.y + face.y) / 3.0];
}

/// Environment texel seen along `direction`.
pub fn sample_cubemap(texture: &Texture, direction: Vector3<f32>) -> u32 {
    let uv = cubemap_uv(direction);
    return texture.sample(uv.x, uv.y);
}
