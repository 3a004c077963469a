use std::path::Path;

use anyhow::{Context, Result};

use super::CONFIG_FILE;

/// Hand-crafted config template with every key commented out, so the file
/// documents the knobs while still resolving to the built-in defaults.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Input validation — all fields optional.
# ─────────────────────────────────────────────────────────
[input]
# max_file_size_mib = 10
# allowed_formats = ["image/jpeg", "image/png", "image/gif", "image/webp"]

# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[diff]
# threshold = 30                    # per-channel tolerance, 0-255 (0 = exact)
"#;

pub fn config_file_exists_in(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).exists()
}

/// Write the template into `dir`, creating it if needed.
pub fn write_template_in(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
