use std::path::{Path, PathBuf};

use anyhow::Result;
use shaman_config::{config_dir, config_file_path, load_and_prepare, PreparedConfig, ShamanConfig};
use shaman_turn::ImageAttachment;

/// A prepared config and the file it was read from (which may not exist).
pub struct LoadedConfig {
    pub path: PathBuf,
    pub prepared: PreparedConfig,
}

/// Load the Shaman configuration from `dir`, or from the default config
/// directory (`SHAMAN_CONFIG_DIR` or `~/.shaman`).
pub async fn load(dir: Option<&Path>) -> Result<LoadedConfig> {
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(config_dir);
    let path = config_file_path(&dir);
    let prepared = load_and_prepare(&path).await?;
    Ok(LoadedConfig { path, prepared })
}

/// Directory the rolling log file is written to. Created if missing.
pub fn log_dir(config: &ShamanConfig) -> Result<PathBuf> {
    let dir = PathBuf::from(&config.logging.dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Resolve an `--image` argument: either a `data:` URI or a file path.
pub async fn resolve_image(arg: &str) -> Result<ImageAttachment> {
    if arg.starts_with("data:") {
        ImageAttachment::from_data_uri(arg)
    } else {
        ImageAttachment::load(Path::new(arg)).await
    }
}
