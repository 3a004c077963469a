use std::path::Path;
use std::time::Duration;

use pixeldiff::Comparison;

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// The user-facing percentage line, two decimals with ties rounded up.
pub fn format_percent(diff_percent: f64) -> String {
    format!("Difference: {:.2}%", round_ties_up(diff_percent))
}

/// `{:.2}` rounds exact ties to even. A value that sits exactly halfway at the
/// third decimal must be a multiple of 1/8 with an odd numerator (x.125, x.375,
/// x.625, x.875); those are bumped to the upper neighbour, everything else is
/// left for the formatter.
fn round_ties_up(v: f64) -> f64 {
    let eighths = v * 8.0;
    if eighths.fract() == 0.0 && eighths.rem_euclid(2.0) == 1.0 {
        (v * 100.0 + 0.5).floor() / 100.0
    } else {
        v
    }
}

/// Print the result block for one comparison.
pub fn print_comparison(comparison: &Comparison, threshold: u8, overlay: Option<&Path>) {
    let result = &comparison.result;
    let (w, h) = comparison.dimensions();

    let color = if result.diff_pixels == 0 { "32" } else { "31" };
    println!("\x1b[{color}m{}\x1b[0m", format_percent(result.diff_percent));
    println!(
        "  {} of {} pixels differ  \x1b[2m({w}x{h}, threshold {threshold})\x1b[0m",
        result.diff_pixels, result.total_pixels
    );
    if let Some(path) = overlay {
        println!("  overlay  {}", path.display());
    }
    println!(
        "  \x1b[2m{} (decode {}, diff {})\x1b[0m",
        format_duration(comparison.timings.total()),
        format_duration(comparison.timings.decode),
        format_duration(comparison.timings.diff)
    );
}
