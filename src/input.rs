use nalgebra::{vector, Vector2};
use show_image::event::{self, VirtualKeyCode};

/// Snapshot of the keys and mouse motion that drive the camera.
/// Key flags stay set while the key is held, the mouse delta accumulates
/// over one frame and is cleared by `end_frame`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub quit: bool,
    pub forward: bool,
    pub backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub look_left: bool,
    pub look_right: bool,
    pub mouse_delta: Vector2<f32>,
}

impl InputState {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Folds one window event into the state, everything unrelated is ignored.
    pub fn handle_event(&mut self, window_event: &event::WindowEvent) {
        match window_event {
            event::WindowEvent::KeyboardInput(keyboard) => {
                if let Some(key) = keyboard.input.key_code {
                    self.apply_key(key, keyboard.input.state.is_pressed());
                }
            }
            event::WindowEvent::MouseMove(motion) => {
                let delta = motion.position - motion.prev_position;
                self.apply_mouse_motion(delta.x, delta.y);
            }
            event::WindowEvent::CloseRequested(_) | event::WindowEvent::Destroyed(_) => {
                self.quit = true;
            }
            _ => (),
        }
    }

    pub fn apply_key(&mut self, key: VirtualKeyCode, pressed: bool) {
        match key {
            VirtualKeyCode::Escape => self.quit |= pressed,
            VirtualKeyCode::W => self.forward = pressed,
            VirtualKeyCode::S => self.backward = pressed,
            VirtualKeyCode::A => self.strafe_left = pressed,
            VirtualKeyCode::D => self.strafe_right = pressed,
            VirtualKeyCode::Up => self.look_up = pressed,
            VirtualKeyCode::Down => self.look_down = pressed,
            VirtualKeyCode::Left => self.look_left = pressed,
            VirtualKeyCode::Right => self.look_right = pressed,
            _ => (),
        }
    }

    pub fn apply_mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += vector![dx, dy];
    }

    /// Drops per-frame motion, held keys carry over to the next frame.
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vector2::zeros();
    }
}
