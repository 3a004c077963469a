pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use pixeldiff::diff::DEFAULT_THRESHOLD;
use pixeldiff::load::{DEFAULT_ALLOWED_FORMATS, DEFAULT_MAX_FILE_SIZE_MIB};

pub use self::resolve::{CliOverrides, resolve_settings};
pub use self::template::{config_file_exists_in, write_template_in};

pub const CONFIG_DIR: &str = ".pixeldiff";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Largest accepted input file, in MiB.
    #[serde(default = "default_max_file_size_mib")]
    pub max_file_size_mib: u64,
    /// Accepted MIME types.
    #[serde(default = "default_allowed_formats")]
    pub allowed_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size_mib: default_max_file_size_mib(),
            allowed_formats: default_allowed_formats(),
        }
    }
}

fn default_max_file_size_mib() -> u64 {
    DEFAULT_MAX_FILE_SIZE_MIB
}

fn default_allowed_formats() -> Vec<String> {
    DEFAULT_ALLOWED_FORMATS
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Per-channel tolerance (0-255). A channel must differ by more than this.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub diff: DiffConfig,
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        validate_max_file_size_mib(self.input.max_file_size_mib)
            .map_err(|e| anyhow::anyhow!("input.{e}"))?;

        if self.input.allowed_formats.is_empty() {
            bail!(
                "input.allowed_formats is empty. List at least one MIME type, e.g.:\n\n  \
                 [input]\n  \
                 allowed_formats = [\"image/png\"]"
            );
        }

        for format in &self.input.allowed_formats {
            if !format.starts_with("image/") {
                bail!("input.allowed_formats entry '{format}' is not an image MIME type");
            }
        }

        Ok(())
    }
}

pub fn validate_max_file_size_mib(v: u64) -> Result<u64, String> {
    if v == 0 {
        return Err("max_file_size_mib must be greater than 0".to_string());
    }
    Ok(v)
}

/// Load `.pixeldiff/config.toml` from the working directory.
/// A missing file yields the defaults.
pub fn load() -> Result<Config> {
    load_from(&Path::new(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.diff.threshold, 30);
        assert_eq!(config.input.max_file_size_mib, 10);
        assert_eq!(config.input.allowed_formats.len(), 4);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let (_dir, path) = write("[diff]\nthreshold = 5\n");
        let config = load_from(&path).unwrap();
        assert_eq!(config.diff.threshold, 5);
        assert_eq!(config.input.max_file_size_mib, 10);
    }

    #[test]
    fn full_file() {
        let (_dir, path) = write(
            "[input]\nmax_file_size_mib = 2\nallowed_formats = [\"image/png\"]\n\n[diff]\nthreshold = 0\n",
        );
        let config = load_from(&path).unwrap();
        assert_eq!(config.input.max_file_size_mib, 2);
        assert_eq!(config.input.allowed_formats, vec!["image/png".to_string()]);
        assert_eq!(config.diff.threshold, 0);
    }

    #[test]
    fn threshold_out_of_range_fails_to_parse() {
        let (_dir, path) = write("[diff]\nthreshold = 300\n");
        let err = load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn zero_size_limit_rejected() {
        let (_dir, path) = write("[input]\nmax_file_size_mib = 0\n");
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("input.max_file_size_mib"));
    }

    #[test]
    fn empty_allow_list_rejected() {
        let (_dir, path) = write("[input]\nallowed_formats = []\n");
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("allowed_formats is empty"));
    }

    #[test]
    fn non_image_mime_rejected() {
        let (_dir, path) = write("[input]\nallowed_formats = [\"text/plain\"]\n");
        assert!(load_from(&path).is_err());
    }
}
