use std::sync::mpsc;

use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions, WindowProxy};

use crate::error::RenderError;
use crate::input::InputState;
use crate::render::buffer::FrameBuffer;

/// Window the finished frame is shown in, plus its event stream.
pub struct Display {
    window: WindowProxy,
    events: mpsc::Receiver<event::WindowEvent>,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Display {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, RenderError> {
        let window_options = WindowOptions {
            size: Some([width, height]),
            ..Default::default()
        };
        let window = create_window(title, window_options).map_err(|e| RenderError::Window(e.to_string()))?;
        let events = window.event_channel().map_err(|e| RenderError::Window(e.to_string()))?;
        return Ok(Self {
            window,
            events,
            width,
            height,
            rgba: Vec::with_capacity((width * height * 4) as usize),
        });
    }

    /// Blits the color buffer into the window.
    pub fn present(&mut self, frame: &FrameBuffer) -> Result<(), RenderError> {
        if frame.width != self.width || frame.height != self.height {
            return Err(RenderError::Window(format!(
                "frame is {}x{} but the window was created for {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        frame.to_rgba8(&mut self.rgba);
        let image = ImageView::new(ImageInfo::rgba8(self.width, self.height), &self.rgba);
        self.window
            .set_image("image", image)
            .map_err(|e| RenderError::Window(e.to_string()))?;
        return Ok(());
    }

    /// Drains every event that piled up since the last frame into `input`.
    pub fn poll_events(&self, input: &mut InputState) {
        for window_event in self.events.try_iter() {
            input.handle_event(&window_event);
        }
    }
}
