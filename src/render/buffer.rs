use crate::color;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl TileRect {
    pub fn width(&self) -> u32 {
        return self.x1 - self.x0;
    }

    pub fn height(&self) -> u32 {
        return self.y1 - self.y0;
    }

    pub fn area(&self) -> u32 {
        return self.width() * self.height();
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        return x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1;
    }
}

/// Anything the rasterizer can write pixels into: the whole frame or one tile of it.
/// Coordinates are always frame coordinates. A tile target drops writes outside `rect()`.
pub trait PixelTarget {
    fn rect(&self) -> TileRect;
    /// Stored 1/w at a pixel, 0 is the far plane.
    fn depth(&self, x: u32, y: u32) -> f32;
    fn put(&mut self, x: u32, y: u32, color: u32, depth: f32);
    /// Color write that leaves the depth buffer alone, used by overlays.
    fn put_color(&mut self, x: u32, y: u32, color: u32);
}

/// Packed `0xAARRGGBB` color buffer plus a parallel buffer of the largest 1/w seen so far.
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    color: Vec<u32>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width * height) as usize;
        return Self {
            width,
            height,
            color: vec![color::BLACK; pixel_count],
            depth: vec![0.0; pixel_count],
        };
    }

    pub fn clear(&mut self, clear_color: u32) {
        self.color.fill(clear_color);
    }

    pub fn clear_depth(&mut self) {
        self.depth.fill(0.0);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        return (x + y * self.width) as usize;
    }

    /// Writes one pixel, silently ignoring coordinates outside the frame.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let index = self.index(x as u32, y as u32);
        self.color[index] = color;
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        return self.color[self.index(x, y)];
    }

    pub fn color(&self) -> &[u32] {
        return &self.color;
    }

    pub fn depth_buffer(&self) -> &[f32] {
        return &self.depth;
    }

    /// Color buffer expanded to RGBA8 bytes for presentation.
    pub fn to_rgba8(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.color.len() * 4);
        for &pixel in &self.color {
            out.extend_from_slice(&color::to_rgba(pixel));
        }
    }

    pub fn full_rect(&self) -> TileRect {
        return TileRect { x0: 0, y0: 0, x1: self.width, y1: self.height };
    }

    /// Raw view handed to render workers for the duration of one frame.
    ///
    /// # Safety
    /// The buffer must outlive every `TileTarget` made from the returned view and must not
    /// be accessed through `self` until all of them are dropped.
    pub unsafe fn share(&mut self) -> SharedFrame {
        return SharedFrame {
            width: self.width,
            height: self.height,
            color_ptr: self.color.as_mut_ptr(),
            depth_ptr: self.depth.as_mut_ptr(),
        };
    }
}

impl PixelTarget for FrameBuffer {
    fn rect(&self) -> TileRect {
        return self.full_rect();
    }

    fn depth(&self, x: u32, y: u32) -> f32 {
        return self.depth[self.index(x, y)];
    }

    fn put(&mut self, x: u32, y: u32, color: u32, depth: f32) {
        let index = self.index(x, y);
        self.color[index] = color;
        self.depth[index] = depth;
    }

    fn put_color(&mut self, x: u32, y: u32, color: u32) {
        let index = self.index(x, y);
        self.color[index] = color;
    }
}

/// Frame buffer pointers shared by all workers during a frame.
/// Workers only ever write through disjoint `TileTarget`s.
#[derive(Clone, Copy)]
pub struct SharedFrame {
    pub width: u32,
    pub height: u32,
    color_ptr: *mut u32,
    depth_ptr: *mut f32,
}

// Safety: the pointers are only dereferenced through `TileTarget`s whose rectangles
// never overlap, and the frame is joined before the owning buffer is touched again.
unsafe impl Send for SharedFrame {}
unsafe impl Sync for SharedFrame {}

impl SharedFrame {
    /// # Safety
    /// No two live targets may cover overlapping rectangles. `rect` is clipped to the frame.
    pub unsafe fn tile(&self, rect: TileRect) -> TileTarget {
        let rect = TileRect { x1: rect.x1.min(self.width), y1: rect.y1.min(self.height), ..rect };
        return TileTarget {
            width: self.width,
            rect,
            color_ptr: self.color_ptr,
            depth_ptr: self.depth_ptr,
        };
    }
}

/// Exclusive window onto one tile of a shared frame.
pub struct TileTarget {
    width: u32,
    rect: TileRect,
    color_ptr: *mut u32,
    depth_ptr: *mut f32,
}

impl TileTarget {
    /// Buffer index of a pixel this tile owns, `None` for anything outside it.
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if !self.rect.contains(x, y) {
            return None;
        }
        return Some((x + y * self.width) as usize);
    }
}

/// Pixels outside the tile belong to other workers: writes there are dropped and
/// reads report the far plane.
impl PixelTarget for TileTarget {
    fn rect(&self) -> TileRect {
        return self.rect;
    }

    fn depth(&self, x: u32, y: u32) -> f32 {
        let index = match self.index(x, y) {
            Some(index) => index,
            None => return 0.0,
        };
        unsafe {
            return *self.depth_ptr.add(index);
        }
    }

    fn put(&mut self, x: u32, y: u32, color: u32, depth: f32) {
        if let Some(index) = self.index(x, y) {
            unsafe {
                *self.color_ptr.add(index) = color;
                *self.depth_ptr.add(index) = depth;
            }
        }
    }

    fn put_color(&mut self, x: u32, y: u32, color: u32) {
        if let Some(index) = self.index(x, y) {
            unsafe {
                *self.color_ptr.add(index) = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black_and_far() {
        let frame = FrameBuffer::new(4, 3);
        assert!(frame.color().iter().all(|&c| c == color::BLACK));
        assert!(frame.depth_buffer().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn clears_are_independent() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.put(1, 1, color::WHITE, 0.5);
        frame.clear(0xFF11_2233);
        assert_eq!(frame.pixel(1, 1), 0xFF11_2233);
        assert_eq!(frame.depth(1, 1), 0.5);
        frame.clear_depth();
        assert_eq!(frame.depth(1, 1), 0.0);
    }

    #[test]
    fn put_pixel_ignores_out_of_range() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.put_pixel(-1, 0, color::WHITE);
        frame.put_pixel(2, 1, color::WHITE);
        frame.put_pixel(1, 1, color::WHITE);
        assert_eq!(frame.color().iter().filter(|&&c| c == color::WHITE).count(), 1);
    }

    #[test]
    fn tile_writes_land_in_frame_coordinates() {
        let mut frame = FrameBuffer::new(8, 8);
        {
            let shared = unsafe { frame.share() };
            let mut tile = unsafe { shared.tile(TileRect { x0: 4, y0: 4, x1: 8, y1: 8 }) };
            tile.put(5, 6, color::WHITE, 0.25);
            assert_eq!(tile.depth(5, 6), 0.25);
        }
        assert_eq!(frame.pixel(5, 6), color::WHITE);
        assert_eq!(frame.depth(5, 6), 0.25);
    }

    #[test]
    fn tile_ignores_pixels_it_does_not_own() {
        let mut frame = FrameBuffer::new(8, 8);
        frame.put(1, 1, color::WHITE, 0.5);
        {
            let shared = unsafe { frame.share() };
            let mut tile = unsafe { shared.tile(TileRect { x0: 4, y0: 4, x1: 8, y1: 8 }) };
            tile.put(1, 1, 0xFFDE_ADBE, 1.0);
            tile.put_color(7, 3, 0xFFDE_ADBE);
            tile.put(100, 100, 0xFFDE_ADBE, 1.0);
            assert_eq!(tile.depth(1, 1), 0.0);
        }
        assert_eq!(frame.pixel(1, 1), color::WHITE);
        assert_eq!(frame.depth(1, 1), 0.5);
        assert!(frame.color().iter().all(|&c| c != 0xFFDE_ADBE));
    }

    #[test]
    fn rgba_bytes_follow_pixel_order() {
        let mut frame = FrameBuffer::new(2, 1);
        frame.put_pixel(1, 0, color::pack(0x40, 1, 2, 3));
        let mut bytes = Vec::new();
        frame.to_rgba8(&mut bytes);
        assert_eq!(bytes, vec![0, 0, 0, 0xFF, 1, 2, 3, 0x40]);
    }
}
