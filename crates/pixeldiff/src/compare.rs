use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::diff::{DEFAULT_THRESHOLD, DiffEngine, DiffResult};
use crate::error::{CompareError, Side};
use crate::load::{self, Limits};
use crate::raster::RasterImage;

/// Everything a comparison needs besides the two inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSettings {
    pub threshold: u8,
    pub limits: Limits,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            limits: Limits::default(),
        }
    }
}

/// An input as supplied by the caller: raw bytes plus the declared MIME type.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: Some(mime.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompareTimings {
    /// Wall time for both decodes (they run concurrently).
    pub decode: Duration,
    pub diff: Duration,
}

impl CompareTimings {
    pub fn total(&self) -> Duration {
        self.decode + self.diff
    }
}

#[derive(Debug)]
pub struct Comparison {
    pub result: DiffResult,
    pub timings: CompareTimings,
}

impl Comparison {
    pub fn dimensions(&self) -> (u32, u32) {
        self.result.overlay.dimensions()
    }
}

/// Runs before/after comparisons, keeping one [`DiffEngine`] (and its
/// overlay buffer) alive across calls.
#[derive(Debug)]
pub struct Comparator {
    settings: CompareSettings,
    engine: Option<DiffEngine>,
}

impl Comparator {
    pub fn new(settings: CompareSettings) -> Self {
        let engine = DiffEngine::new(settings.threshold);
        Self {
            settings,
            engine: Some(engine),
        }
    }

    pub fn settings(&self) -> &CompareSettings {
        &self.settings
    }

    /// Hand a finished comparison's overlay storage back for the next run.
    pub fn recycle(&mut self, comparison: Comparison) {
        if let Some(engine) = self.engine.as_mut() {
            engine.recycle(comparison.result.overlay);
        }
    }

    /// Compare two files on disk.
    ///
    /// Sizes and declared types are validated from metadata and extension
    /// before either file is read.
    pub async fn compare_files(
        &mut self,
        before: Option<&Path>,
        after: Option<&Path>,
    ) -> Result<Comparison, CompareError> {
        let before = before.ok_or(CompareError::MissingInput(Side::Before))?;
        let after = after.ok_or(CompareError::MissingInput(Side::After))?;

        let before_mime = precheck(before, Side::Before, &self.settings.limits).await?;
        let after_mime = precheck(after, Side::After, &self.settings.limits).await?;

        let (before_bytes, after_bytes) =
            tokio::try_join!(read(before.to_path_buf()), read(after.to_path_buf()))?;

        self.compare_uploads(
            Some(Upload {
                bytes: before_bytes,
                mime: before_mime,
            }),
            Some(Upload {
                bytes: after_bytes,
                mime: after_mime,
            }),
        )
        .await
    }

    /// Validate, decode both inputs concurrently, then diff.
    pub async fn compare_uploads(
        &mut self,
        before: Option<Upload>,
        after: Option<Upload>,
    ) -> Result<Comparison, CompareError> {
        let before = before.ok_or(CompareError::MissingInput(Side::Before))?;
        let after = after.ok_or(CompareError::MissingInput(Side::After))?;

        let limits = &self.settings.limits;
        load::validate(before.bytes.len() as u64, before.mime.as_deref(), limits)
            .map_err(|e| e.for_side(Side::Before))?;
        load::validate(after.bytes.len() as u64, after.mime.as_deref(), limits)
            .map_err(|e| e.for_side(Side::After))?;

        let t_decode = Instant::now();
        let (before_img, after_img) = tokio::try_join!(
            decode_blocking(before.bytes, Side::Before),
            decode_blocking(after.bytes, Side::After),
        )?;
        let decode = t_decode.elapsed();
        debug!(
            before = ?before_img.dimensions(),
            after = ?after_img.dimensions(),
            elapsed_ms = decode.as_millis() as u64,
            "decoded inputs"
        );

        if before_img.dimensions() != after_img.dimensions() {
            return Err(CompareError::DimensionMismatch {
                before: before_img.dimensions(),
                after: after_img.dimensions(),
            });
        }

        let t_diff = Instant::now();
        let mut engine = self
            .engine
            .take()
            .unwrap_or_else(|| DiffEngine::new(self.settings.threshold));
        let (engine, result) = tokio::task::spawn_blocking(move || {
            let result = engine.diff(&before_img, &after_img);
            (engine, result)
        })
        .await?;
        self.engine = Some(engine);
        let result = result?;

        Ok(Comparison {
            result,
            timings: CompareTimings {
                decode,
                diff: t_diff.elapsed(),
            },
        })
    }
}

/// Validate declared size (file length) and type (extension) for one input.
async fn precheck(
    path: &Path,
    side: Side,
    limits: &Limits,
) -> Result<Option<String>, CompareError> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|source| CompareError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let mime = load::mime_for_path(path).map(str::to_string);
    load::validate(meta.len(), mime.as_deref(), limits).map_err(|e| e.for_side(side))?;
    Ok(mime)
}

async fn read(path: PathBuf) -> Result<Vec<u8>, CompareError> {
    tokio::fs::read(&path).await.map_err(|source| CompareError::Io {
        path: path.display().to_string(),
        source,
    })
}

async fn decode_blocking(bytes: Vec<u8>, side: Side) -> Result<RasterImage, CompareError> {
    tokio::task::spawn_blocking(move || load::decode(&bytes))
        .await?
        .map_err(|e| e.for_side(side))
}
