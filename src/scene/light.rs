use log::warn;
use nalgebra::{Matrix4, Vector3};

use crate::math::{from_hom, to_hom_point};

pub const MAX_LIGHTS: usize = 10;

/// Point light with a flat packed color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub color: u32,
}

/// Bounded set of lights, the shaders walk all of them per pixel.
#[derive(Debug, Clone, Default)]
pub struct Lights {
    lights: Vec<Light>,
}

impl Lights {
    pub fn new() -> Self {
        return Self { lights: Vec::with_capacity(MAX_LIGHTS) };
    }

    /// Adds a light, returns false and drops it once the set is full.
    pub fn push(&mut self, light: Light) -> bool {
        if self.lights.len() >= MAX_LIGHTS {
            warn!("Light limit of {} reached, ignoring light at {:?}", MAX_LIGHTS, light.position);
            return false;
        }
        self.lights.push(light);
        return true;
    }

    pub fn len(&self) -> usize {
        return self.lights.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.lights.is_empty();
    }

    pub fn as_slice(&self) -> &[Light] {
        return &self.lights;
    }

    /// Copy of the set with every position moved into view space.
    pub fn to_view_space(&self, view_matrix: &Matrix4<f32>) -> Lights {
        let lights = self
            .lights
            .iter()
            .map(|light| Light {
                position: from_hom(view_matrix * to_hom_point(light.position)),
                color: light.color,
            })
            .collect();
        return Lights { lights };
    }
}
