use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::CompareError;
use crate::raster::RasterImage;

const FILENAME_PREFIX: &str = "image-comparison-overlay";

/// Encode a raster as a PNG byte stream.
pub fn encode_png(image: &RasterImage) -> Result<Vec<u8>, CompareError> {
    let mut png = Vec::new();
    image
        .as_image()
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(CompareError::Encode)?;
    Ok(png)
}

/// `image-comparison-overlay-2024-01-01T00-00-00.png`: ISO-8601 to the
/// second, colons replaced with hyphens.
pub fn overlay_filename(at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y-%m-%dT%H:%M:%S").to_string().replace(':', "-");
    format!("{FILENAME_PREFIX}-{stamp}.png")
}

/// Write the overlay as PNG into `dir`, creating it if needed.
pub fn save_overlay(
    overlay: &RasterImage,
    dir: &Path,
    at: DateTime<Utc>,
) -> Result<PathBuf, CompareError> {
    std::fs::create_dir_all(dir).map_err(|source| CompareError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let path = dir.join(overlay_filename(at));
    let png = encode_png(overlay)?;
    std::fs::write(&path, &png).map_err(|source| CompareError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = png.len(), "overlay saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_replaces_colons() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            overlay_filename(at),
            "image-comparison-overlay-2024-01-01T00-00-00.png"
        );
    }

    #[test]
    fn filename_drops_subseconds() {
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap()
            + chrono::Duration::milliseconds(987);
        assert_eq!(
            overlay_filename(at),
            "image-comparison-overlay-2025-12-31T23-59-58.png"
        );
    }

    #[test]
    fn png_decodes_back_to_overlay() {
        let overlay = RasterImage::from_rgba(2, 1, vec![0, 0, 0, 255, 255, 0, 0, 128]).unwrap();
        let png = encode_png(&overlay).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = crate::load::decode(&png).unwrap();
        assert_eq!(decoded, overlay);
    }

    #[test]
    fn save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let overlay = RasterImage::solid(3, 3, [255, 0, 0, 128]).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap();

        let path = save_overlay(&overlay, &dir, at).unwrap();

        assert_eq!(
            path,
            dir.join("image-comparison-overlay-2024-06-15T12-30-45.png")
        );
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(crate::load::decode(&bytes).unwrap(), overlay);
    }
}
