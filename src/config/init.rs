use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::grading::GradingConfig;

const HEADER: &str = "\
# marksheet configuration
# Every key under `grading` is optional; removed keys fall back to the
# built-in rules shown here.
";

/// Write the built-in configuration as YAML.
///
/// Uses `path` or the default config path. An existing file is only replaced
/// when `force` is set. The file is written atomically so a failed write never
/// leaves a truncated config behind.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config {
        grading: Some(GradingConfig::default()),
    };
    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        ensure_dir(parent)?;
    }

    let mut file = AtomicWriteFile::open(&config_path)
        .with_context(|| format!("Failed to open atomic write file at {}", config_path.display()))?;
    file.write_all(HEADER.as_bytes())
        .and_then(|_| file.write_all(yaml.as_bytes()))
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    file.commit().context("Failed to save config")?;

    tracing::info!("Config written to {}", config_path.display());
    Ok(config_path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}
