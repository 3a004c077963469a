use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::CompareError;
use crate::raster::RasterImage;

pub const MIB: u64 = 1024 * 1024;

/// Default upper bound on an input file, in MiB.
pub const DEFAULT_MAX_FILE_SIZE_MIB: u64 = 10;

pub const DEFAULT_ALLOWED_FORMATS: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Input constraints checked before an image is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum input size in bytes.
    pub max_file_size: u64,
    /// Accepted MIME types.
    pub allowed_formats: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE_MIB * MIB,
            allowed_formats: DEFAULT_ALLOWED_FORMATS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl Limits {
    fn max_file_size_mib(&self) -> String {
        let mib = self.max_file_size as f64 / MIB as f64;
        if mib.fract() == 0.0 {
            format!("{mib:.0}")
        } else {
            format!("{mib:.2}")
        }
    }
}

/// Check declared size and type against `limits`. Size is checked first.
pub fn validate(len: u64, mime: Option<&str>, limits: &Limits) -> Result<(), CompareError> {
    if len > limits.max_file_size {
        return Err(CompareError::Validation(format!(
            "File size too large. Maximum size is {}MB",
            limits.max_file_size_mib()
        )));
    }

    let allowed = mime.is_some_and(|m| limits.allowed_formats.iter().any(|f| f == m));
    if !allowed {
        return Err(CompareError::Validation(format!(
            "Unsupported file format. Supported formats: {}",
            limits.allowed_formats.join(", ")
        )));
    }

    Ok(())
}

/// Validate, then decode `bytes` into an RGBA raster.
///
/// The declared MIME type only gates validation; decoding sniffs the content.
pub fn load(
    bytes: &[u8],
    mime: Option<&str>,
    limits: &Limits,
) -> Result<RasterImage, CompareError> {
    validate(bytes.len() as u64, mime, limits)?;
    decode(bytes)
}

/// Decode without validation.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, CompareError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CompareError::Decode(format!("Failed to read file: {e}")))?;
    let format = reader.format();
    let decoded = reader
        .decode()
        .map_err(|e| CompareError::Decode(format!("Failed to load image: {e}")))?;
    debug!(
        ?format,
        width = decoded.width(),
        height = decoded.height(),
        "decoded image"
    );
    decoded_raster(decoded.to_rgba8())
}

/// A decoded image with no pixels is a decode failure, not a raster misuse.
fn decoded_raster(image: RgbaImage) -> Result<RasterImage, CompareError> {
    RasterImage::from_image(image).map_err(|e| match e {
        CompareError::InvalidRaster(msg) => CompareError::Decode(msg),
        other => other,
    })
}

/// Declared MIME type for a file, from its extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let format = ImageFormat::from_path(path).ok()?;
    Some(format.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_bytes(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, color);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn oversized_file_cites_limit_in_mib() {
        let limits = Limits::default();
        let err = validate(limits.max_file_size + 1, Some("image/png"), &limits).unwrap_err();
        assert!(matches!(err, CompareError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "File size too large. Maximum size is 10MB"
        );
    }

    #[test]
    fn file_at_limit_passes() {
        let limits = Limits::default();
        assert!(validate(limits.max_file_size, Some("image/png"), &limits).is_ok());
    }

    #[test]
    fn size_checked_before_type() {
        let limits = Limits::default();
        let err = validate(u64::MAX, Some("image/bmp"), &limits).unwrap_err();
        assert!(err.to_string().starts_with("File size too large"));
    }

    #[test]
    fn bmp_rejected_with_allowed_list() {
        let err = validate(100, Some("image/bmp"), &Limits::default()).unwrap_err();
        assert!(matches!(err, CompareError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Supported formats: image/jpeg, image/png, image/gif, image/webp"
        );
    }

    #[test]
    fn unknown_type_rejected() {
        let err = validate(100, None, &Limits::default()).unwrap_err();
        assert!(err.to_string().starts_with("Unsupported file format"));
    }

    #[test]
    fn fractional_limit_formatting() {
        let limits = Limits {
            max_file_size: MIB + MIB / 2,
            ..Limits::default()
        };
        let err = validate(limits.max_file_size + 1, Some("image/png"), &limits).unwrap_err();
        assert!(err.to_string().ends_with("1.50MB"));
    }

    #[test]
    fn loads_png() {
        let bytes = png_bytes(3, 2, Rgba([10, 20, 30, 255]));
        let img = load(&bytes, Some("image/png"), &Limits::default()).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.pixel(2, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn decode_sniffs_content_not_declared_type() {
        // Declared as JPEG (allowed) but actually PNG.
        let bytes = png_bytes(1, 1, Rgba([0, 0, 0, 255]));
        let img = load(&bytes, Some("image/jpeg"), &Limits::default()).unwrap();
        assert_eq!(img.dimensions(), (1, 1));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = load(b"definitely not an image", Some("image/png"), &Limits::default())
            .unwrap_err();
        assert!(matches!(err, CompareError::Decode(_)));
    }

    #[test]
    fn zero_sized_decode_is_decode_error() {
        let err = decoded_raster(RgbaImage::new(0, 3)).unwrap_err();
        assert!(matches!(err, CompareError::Decode(_)));
        assert_eq!(err.to_string(), "Invalid image dimensions (0x3)");
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("a.gif")), Some("image/gif"));
        assert_eq!(mime_for_path(Path::new("a.bmp")), Some("image/bmp"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }
}
