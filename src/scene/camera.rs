use nalgebra as na;
use na::{vector, Matrix4, Vector3};

use crate::input::InputState;
use crate::math::{from_hom, look_at, normalize_or_zero, rotation_x, rotation_y, to_hom_vector};

/// Angular speed of the arrow keys in radians per second.
const LOOK_RATE: f32 = 1.5;
/// Pitch stays short of straight up or down so the look-at basis never degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Free flying camera, orientation given by yaw around Y and pitch around X.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        return Self::new(2.0, 0.001);
    }
}

impl Camera {
    /// Camera five units behind the origin, looking down +z.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        return Self {
            position: vector![0.0, 0.0, -5.0],
            direction: vector![0.0, 0.0, 1.0],
            up: vector![0.0, 1.0, 0.0],
            yaw: 0.0,
            pitch: 0.0,
            speed,
            sensitivity,
        };
    }

    /// Recomputes the forward direction from yaw and pitch.
    pub fn update_direction(&mut self) {
        let rotation = rotation_y(self.yaw) * rotation_x(self.pitch);
        self.direction = normalize_or_zero(from_hom(rotation * to_hom_vector(vector![0.0, 0.0, 1.0])));
    }

    pub fn target(&self) -> Vector3<f32> {
        return self.position + self.direction;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        return look_at(self.position, self.target(), self.up);
    }

    /// Applies one frame of input, `dt` in seconds.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        self.yaw += input.mouse_delta.x * self.sensitivity;
        self.pitch -= input.mouse_delta.y * self.sensitivity;

        let look = LOOK_RATE * dt;
        if input.look_left {
            self.yaw -= look;
        }
        if input.look_right {
            self.yaw += look;
        }
        // Positive pitch tilts towards -y, which is up on screen.
        if input.look_up {
            self.pitch += look;
        }
        if input.look_down {
            self.pitch -= look;
        }
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_direction();

        let step = self.speed * dt;
        // Strafe axis is forward x up, which points to the camera's left.
        let strafe = normalize_or_zero(self.direction.cross(&self.up));
        if input.forward {
            self.position += self.direction * step;
        }
        if input.backward {
            self.position -= self.direction * step;
        }
        if input.strafe_left {
            self.position += strafe * step;
        }
        if input.strafe_right {
            self.position -= strafe * step;
        }
    }
}
