use image::{Rgba, RgbaImage};

use crate::error::CompareError;

/// Bytes per RGBA sample.
pub const CHANNELS: usize = 4;

/// An immutable, non-empty RGBA raster, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    inner: RgbaImage,
}

impl RasterImage {
    /// Build a raster from raw RGBA bytes.
    ///
    /// Fails when either dimension is zero or `pixels.len() != width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CompareError> {
        if width == 0 || height == 0 {
            return Err(CompareError::InvalidRaster(format!(
                "Invalid image dimensions ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(CompareError::InvalidRaster(format!(
                "Pixel buffer holds {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        let inner = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            CompareError::InvalidRaster(format!("Invalid pixel buffer for {width}x{height}"))
        })?;
        Ok(Self { inner })
    }

    /// Wrap an already-decoded image, rejecting zero-sized ones.
    pub fn from_image(inner: RgbaImage) -> Result<Self, CompareError> {
        let (w, h) = inner.dimensions();
        if w == 0 || h == 0 {
            return Err(CompareError::InvalidRaster(format!(
                "Invalid image dimensions ({w}x{h})"
            )));
        }
        Ok(Self { inner })
    }

    /// A raster filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, CompareError> {
        Self::from_image(RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Raw RGBA bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        self.inner.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.inner.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.inner
    }

    pub fn into_image(self) -> RgbaImage {
        self.inner
    }
}
