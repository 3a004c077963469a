use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use pixeldiff::{CompareSettings, Comparator, export};

use crate::report::{json, terminal};

pub struct CompareArgs {
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub fail_on_diff: bool,
}

/// `pixeldiff compare` — decode, diff, report, optionally export.
/// Returns exit code: 0, or 1 when `fail_on_diff` is set and pixels differ.
pub async fn compare(settings: CompareSettings, args: CompareArgs) -> Result<i32> {
    debug!(
        threshold = settings.threshold,
        max_file_size = settings.limits.max_file_size,
        "resolved settings"
    );

    let mut comparator = Comparator::new(settings);
    let threshold = comparator.settings().threshold;
    let comparison = comparator
        .compare_files(args.before.as_deref(), args.after.as_deref())
        .await?;

    let overlay_path = match &args.output {
        Some(dir) => Some(export::save_overlay(
            &comparison.result.overlay,
            dir,
            Utc::now(),
        )?),
        None => None,
    };

    info!(
        diff_percent = comparison.result.diff_percent,
        diff_pixels = comparison.result.diff_pixels,
        "comparison complete"
    );

    if args.json {
        json::print_summary(&json::Summary::new(
            &comparison,
            threshold,
            overlay_path.as_deref(),
        ))?;
    } else {
        terminal::print_comparison(&comparison, threshold, overlay_path.as_deref());
    }

    if args.fail_on_diff && comparison.result.diff_pixels > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
