use anyhow::{Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 建立資料夾（含上層）；已存在不視為錯誤
pub fn ensure_directory_exists(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
