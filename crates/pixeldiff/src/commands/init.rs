use std::path::Path;

use anyhow::{Result, bail};

use crate::config;

/// `pixeldiff init` — create .pixeldiff/config.toml.
pub fn init(force: bool) -> Result<()> {
    init_in(Path::new(config::CONFIG_DIR), force)?;
    let verb = if force { "Regenerated" } else { "Created" };
    println!("{verb} .pixeldiff/config.toml");
    Ok(())
}

/// Write the config template into `dir`, refusing to overwrite unless `force`.
fn init_in(dir: &Path, force: bool) -> Result<()> {
    if !force && config::config_file_exists_in(dir) {
        bail!(
            "{} already exists (use --force to overwrite)",
            dir.join(config::CONFIG_FILE).display()
        );
    }
    config::write_template_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_overwrite_without_force() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(config::CONFIG_DIR);
        let path = dir.join(config::CONFIG_FILE);

        init_in(&dir, false).unwrap();
        std::fs::write(&path, "[diff]\nthreshold = 7\n").unwrap();

        let err = init_in(&dir, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let kept = std::fs::read_to_string(&path).unwrap();
        assert_eq!(kept, "[diff]\nthreshold = 7\n");
    }

    #[test]
    fn force_regenerates() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(config::CONFIG_DIR);
        let path = dir.join(config::CONFIG_FILE);

        init_in(&dir, false).unwrap();
        std::fs::write(&path, "[diff]\nthreshold = 7\n").unwrap();
        init_in(&dir, true).unwrap();

        let config = config::load_from(&path).unwrap();
        assert_eq!(config.diff.threshold, 30);
    }
}
