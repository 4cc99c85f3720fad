//! Packed `0xAARRGGBB` colors and the gamma round trip used by the shaders.

use nalgebra::{vector, Vector3};

pub const BLACK: u32 = 0xFF00_0000;
pub const WHITE: u32 = 0xFFFF_FFFF;

const GAMMA: f32 = 2.2;
const GAMMA_INVERSE: f32 = 1.0 / 2.2;

pub fn pack(a: u8, r: u8, g: u8, b: u8) -> u32 {
    return (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32;
}

pub fn alpha(color: u32) -> u8 {
    return (color >> 24) as u8;
}

/// Red, green and blue channels in that order.
pub fn rgb(color: u32) -> [u8; 3] {
    return [(color >> 16) as u8, (color >> 8) as u8, color as u8];
}

pub fn from_rgba(pixel: [u8; 4]) -> u32 {
    return pack(pixel[3], pixel[0], pixel[1], pixel[2]);
}

pub fn to_rgba(color: u32) -> [u8; 4] {
    let [r, g, b] = rgb(color);
    return [r, g, b, alpha(color)];
}

/// Channels scaled to [0, 1] with no gamma applied, used for light colors.
pub fn to_unit(color: u32) -> Vector3<f32> {
    let [r, g, b] = rgb(color);
    return vector![r as f32, g as f32, b as f32] / 255.0;
}

/// Gamma encoded texture color brought to linear light.
pub fn to_linear(color: u32) -> Vector3<f32> {
    return to_unit(color).map(|c| c.powf(GAMMA));
}

/// Linear light back to gamma space, clamped to a byte, keeping the given alpha.
pub fn from_linear(alpha: u8, linear: Vector3<f32>) -> u32 {
    let encode = |c: f32| (c.max(0.0).powf(GAMMA_INVERSE) * 255.0).min(255.0) as u8;
    return pack(alpha, encode(linear.x), encode(linear.y), encode(linear.z));
}
