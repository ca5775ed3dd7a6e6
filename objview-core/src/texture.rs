/// Image-backed textures for textured meshes
use std::path::{Path, PathBuf};

use image::RgbaImage;

/// Error decoding a texture image from disk
#[derive(Debug, thiserror::Error)]
#[error("failed to load texture {}: {source}", .path.display())]
pub struct TextureError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// A decoded texture held in CPU memory.
///
/// Rows are flipped at load time so that texture coordinate (0, 0) refers
/// to the bottom-left corner of the source image, matching the convention
/// the OBJ format assumes.
pub struct Texture {
    pixels: RgbaImage,
}

impl Texture {
    /// Decode an image file into a texture
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| TextureError {
            path: path.to_path_buf(),
            source,
        })?;
        let pixels = decoded.flipv().to_rgba8();
        tracing::info!(
            path = %path.display(),
            width = pixels.width(),
            height = pixels.height(),
            "loaded texture"
        );
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Nearest-neighbor sample with coordinates wrapping outside [0, 1]
    pub fn sample(&self, u: f32, v: f32) -> [u8; 3] {
        let u = u - u.floor();
        let v = v - v.floor();
        let x = ((u * self.pixels.width() as f32) as u32).min(self.pixels.width() - 1);
        let y = ((v * self.pixels.height() as f32) as u32).min(self.pixels.height() - 1);
        let pixel = self.pixels.get_pixel(x, y).0;
        [pixel[0], pixel[1], pixel[2]]
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("objview-{}-{}", std::process::id(), name))
    }

    fn checker() -> Texture {
        // 2x2: red / green on the top row, blue / white on the bottom row
        let mut pixels = RgbaImage::new(2, 2);
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        pixels.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        pixels.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        pixels.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        Texture { pixels }
    }

    #[test]
    fn test_sample_corners() {
        let texture = checker();
        assert_eq!(texture.sample(0.0, 0.0), [255, 0, 0]);
        assert_eq!(texture.sample(0.9, 0.0), [0, 255, 0]);
        assert_eq!(texture.sample(0.0, 0.9), [0, 0, 255]);
        assert_eq!(texture.sample(0.9, 0.9), [255, 255, 255]);
    }

    #[test]
    fn test_sample_wraps() {
        let texture = checker();
        assert_eq!(texture.sample(1.25, 0.0), texture.sample(0.25, 0.0));
        assert_eq!(texture.sample(-0.75, 0.0), texture.sample(0.25, 0.0));
        assert_eq!(texture.sample(0.0, 2.5), texture.sample(0.0, 0.5));
    }

    #[test]
    fn test_sample_edge_does_not_overflow() {
        let texture = checker();
        // u == 1.0 wraps to 0.0 rather than reading past the last column
        assert_eq!(texture.sample(1.0, 1.0), texture.sample(0.0, 0.0));
    }

    #[test]
    fn test_open_missing_file() {
        let result = Texture::open("/definitely/not/a/texture.png");
        assert!(result.is_err());
    }

    #[test]
    fn test_open_flips_rows() {
        // 1x2 image file: red top row, blue bottom row
        let mut pixels = RgbaImage::new(1, 2);
        pixels.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        pixels.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let path = temp_path("flip.png");
        pixels.save(&path).unwrap();

        let texture = Texture::open(&path);
        std::fs::remove_file(&path).ok();
        let texture = texture.unwrap();

        // v = 0 addresses the bottom row of the file
        assert_eq!(texture.sample(0.0, 0.0), [0, 0, 255]);
        assert_eq!(texture.sample(0.0, 0.9), [255, 0, 0]);
    }
}
