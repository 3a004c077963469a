use tracing::debug;

use crate::error::CompareError;
use crate::raster::{CHANNELS, RasterImage};

/// Per-channel tolerance used when none is configured.
pub const DEFAULT_THRESHOLD: u8 = 30;

/// Overlay color for pixels classified as different: red at half alpha.
pub const HIGHLIGHT: [u8; 4] = [255, 0, 0, 128];

/// Counts from a single comparison pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffStats {
    /// Pixels where any channel (alpha included) differs by more than the threshold.
    pub diff_pixels: u64,
    /// `width * height`.
    pub total_pixels: u64,
    /// `diff_pixels / total_pixels * 100`, in `[0.0, 100.0]`.
    pub diff_percent: f64,
}

/// Owned outcome of a comparison.
#[derive(Debug, Clone)]
pub struct DiffResult {
    pub diff_percent: f64,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// Same dimensions as the inputs.
    pub overlay: RasterImage,
}

impl DiffResult {
    pub fn stats(&self) -> DiffStats {
        DiffStats {
            diff_pixels: self.diff_pixels,
            total_pixels: self.total_pixels,
            diff_percent: self.diff_percent,
        }
    }
}

/// Reusable backing storage for overlay pixels.
///
/// Resized on demand; shrinking keeps the allocation so a later, larger
/// comparison up to the old size does not reallocate. An owned overlay takes
/// the storage with it; [`OverlayBuffer::recycle`] hands it back.
#[derive(Debug, Default)]
pub struct OverlayBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl OverlayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, width: u32, height: u32) -> &mut [u8] {
        let len = width as usize * height as usize * CHANNELS;
        if self.data.len() != len {
            debug!(width, height, capacity = self.data.capacity(), "resizing overlay buffer");
            self.data.resize(len, 0);
        }
        self.width = width;
        self.height = height;
        &mut self.data
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Overlay bytes from the last comparison.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Move the current contents out as an owned raster, leaving the buffer empty.
    fn take_raster(&mut self) -> Result<RasterImage, CompareError> {
        let data = std::mem::take(&mut self.data);
        let (width, height) = (self.width, self.height);
        self.width = 0;
        self.height = 0;
        RasterImage::from_rgba(width, height, data)
    }

    /// Reclaim the storage of an overlay that is no longer needed.
    ///
    /// The larger of the two allocations is kept.
    pub fn recycle(&mut self, overlay: RasterImage) {
        let (width, height) = overlay.dimensions();
        let data = overlay.into_image().into_raw();
        if data.capacity() >= self.data.capacity() {
            self.data = data;
            self.width = width;
            self.height = height;
        }
    }
}

/// Threshold diff with a caller-owned overlay buffer that survives across
/// comparisons.
#[derive(Debug)]
pub struct DiffEngine {
    threshold: u8,
    buffer: OverlayBuffer,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DiffEngine {
    pub fn new(threshold: u8) -> Self {
        Self::with_buffer(threshold, OverlayBuffer::new())
    }

    pub fn with_buffer(threshold: u8, buffer: OverlayBuffer) -> Self {
        Self { threshold, buffer }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Compare into the internal buffer; read the overlay with [`Self::buffer`].
    pub fn run(
        &mut self,
        before: &RasterImage,
        after: &RasterImage,
    ) -> Result<DiffStats, CompareError> {
        diff_into(before, after, self.threshold, &mut self.buffer)
    }

    /// Compare and return an owned result.
    ///
    /// The overlay takes the buffer's storage without copying; pass it to
    /// [`Self::recycle`] once done so the next comparison can reuse it.
    pub fn diff(
        &mut self,
        before: &RasterImage,
        after: &RasterImage,
    ) -> Result<DiffResult, CompareError> {
        let stats = self.run(before, after)?;
        let overlay = self.buffer.take_raster()?;
        Ok(into_result(stats, overlay))
    }

    pub fn recycle(&mut self, overlay: RasterImage) {
        self.buffer.recycle(overlay);
    }

    pub fn buffer(&self) -> &OverlayBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> OverlayBuffer {
        self.buffer
    }
}

/// Compare `before` against `after` with a fresh buffer.
///
/// A pixel is different when any of its four channels differs by strictly
/// more than `threshold`. Different pixels become [`HIGHLIGHT`] in the
/// overlay; all others are copied from `before`.
pub fn diff(
    before: &RasterImage,
    after: &RasterImage,
    threshold: u8,
) -> Result<DiffResult, CompareError> {
    let mut buffer = OverlayBuffer::new();
    let stats = diff_into(before, after, threshold, &mut buffer)?;
    let overlay = buffer.take_raster()?;
    Ok(into_result(stats, overlay))
}

/// Single fused pass: count differing pixels and write the overlay into `buffer`.
pub fn diff_into(
    before: &RasterImage,
    after: &RasterImage,
    threshold: u8,
    buffer: &mut OverlayBuffer,
) -> Result<DiffStats, CompareError> {
    if before.dimensions() != after.dimensions() {
        return Err(CompareError::DimensionMismatch {
            before: before.dimensions(),
            after: after.dimensions(),
        });
    }

    let (width, height) = before.dimensions();
    let out = buffer.prepare(width, height);
    let mut diff_pixels: u64 = 0;

    for ((a, b), o) in before
        .pixels()
        .chunks_exact(CHANNELS)
        .zip(after.pixels().chunks_exact(CHANNELS))
        .zip(out.chunks_exact_mut(CHANNELS))
    {
        if is_different(a, b, threshold) {
            diff_pixels += 1;
            o.copy_from_slice(&HIGHLIGHT);
        } else {
            o.copy_from_slice(a);
        }
    }

    let total_pixels = before.pixel_count();
    let diff_percent = diff_pixels as f64 / total_pixels as f64 * 100.0;
    debug!(width, height, diff_pixels, diff_percent, threshold, "diff complete");

    Ok(DiffStats {
        diff_pixels,
        total_pixels,
        diff_percent,
    })
}

fn is_different(a: &[u8], b: &[u8], threshold: u8) -> bool {
    let t = i16::from(threshold);
    a.iter()
        .zip(b)
        .any(|(&x, &y)| (i16::from(x) - i16::from(y)).abs() > t)
}

fn into_result(stats: DiffStats, overlay: RasterImage) -> DiffResult {
    DiffResult {
        diff_percent: stats.diff_percent,
        diff_pixels: stats.diff_pixels,
        total_pixels: stats.total_pixels,
        overlay,
    }
}
