use std::path::Path;

use image::RgbaImage;
use log::info;

use crate::color;
use crate::error::RenderError;

/// Decoded image, texels stored as packed `0xAARRGGBB` row by row.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file, texels are always expanded to RGBA.
    pub channels: u8,
    texels: Vec<u32>,
}

impl Texture {
    /// Loads any raster format `image` can decode.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let decoded = image::open(path).map_err(|source| RenderError::Texture {
            path: path.to_path_buf(),
            source,
        })?;
        let channels = decoded.color().channel_count();
        let texture = Self::from_image(&decoded.to_rgba8(), channels);
        info!(
            "Loaded texture {} ({}x{}, {} channels)",
            path.display(),
            texture.width,
            texture.height,
            channels
        );
        return Ok(texture);
    }

    pub fn from_image(image: &RgbaImage, channels: u8) -> Self {
        let texels = image.pixels().map(|pixel| color::from_rgba(pixel.0)).collect();
        return Self {
            width: image.width(),
            height: image.height(),
            channels,
            texels,
        };
    }

    /// Builds a texture from packed texels, `texels.len()` must equal `width * height`.
    pub fn from_texels(width: u32, height: u32, texels: Vec<u32>) -> Self {
        assert_eq!(texels.len(), (width * height) as usize, "texel count mismatch");
        assert!(width > 0 && height > 0, "texture must not be empty");
        return Self { width, height, channels: 4, texels };
    }

    /// Single color texture, handy for flat shaded meshes.
    pub fn solid(color: u32) -> Self {
        return Self::from_texels(1, 1, vec![color]);
    }

    /// Texel at integer coordinates, wrapping around both edges.
    pub fn texel(&self, x: i32, y: i32) -> u32 {
        let x = x.rem_euclid(self.width as i32) as usize;
        let y = y.rem_euclid(self.height as i32) as usize;
        return self.texels[x + y * self.width as usize];
    }

    /// Nearest texel for a uv pair, repeating outside [0, 1).
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let x = (u * self.width as f32) as i32;
        let y = (v * self.height as f32) as i32;
        return self.texel(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        return Texture::from_texels(2, 2, vec![1, 2, 3, 4]);
    }

    #[test]
    fn sample_picks_nearest_texel() {
        let texture = checker();
        assert_eq!(texture.sample(0.1, 0.1), 1);
        assert_eq!(texture.sample(0.9, 0.1), 2);
        assert_eq!(texture.sample(0.1, 0.9), 3);
        assert_eq!(texture.sample(0.9, 0.9), 4);
    }

    #[test]
    fn sample_wraps_outside_unit_square() {
        let texture = checker();
        assert_eq!(texture.sample(1.1, 0.1), 1);
        assert_eq!(texture.sample(-0.6, 2.6), 4);
        assert_eq!(texture.texel(-1, -1), 4);
    }

    #[test]
    fn converts_rgba_images() {
        let mut image = RgbaImage::new(1, 1);
        image.put_pixel(0, 0, image::Rgba([10, 20, 30, 40]));
        let texture = Texture::from_image(&image, 4);
        assert_eq!(texture.texel(0, 0), color::pack(40, 10, 20, 30));
    }
}
