use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use pixeldiff::Comparison;

/// Machine-readable summary printed by `compare --json`.
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub diff_percent: f64,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    pub width: u32,
    pub height: u32,
    pub threshold: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<&'a Path>,
    pub decode_ms: u64,
    pub diff_ms: u64,
}

impl<'a> Summary<'a> {
    pub fn new(comparison: &Comparison, threshold: u8, overlay: Option<&'a Path>) -> Self {
        let (width, height) = comparison.dimensions();
        Self {
            diff_percent: comparison.result.diff_percent,
            diff_pixels: comparison.result.diff_pixels,
            total_pixels: comparison.result.total_pixels,
            width,
            height,
            threshold,
            overlay,
            decode_ms: comparison.timings.decode.as_millis() as u64,
            diff_ms: comparison.timings.diff.as_millis() as u64,
        }
    }
}

pub fn print_summary(summary: &Summary<'_>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    println!("{json}");
    Ok(())
}
