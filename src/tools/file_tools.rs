use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 產生不重複的暫存檔路徑（只產生路徑，不建立檔案）
#[must_use]
pub fn temp_file_path(temp_dir: &Path, suffix: &str) -> PathBuf {
    temp_dir.join(format!("{}{suffix}", Uuid::new_v4().simple()))
}

/// 刪除檔案，忽略任何錯誤（包含檔案不存在）
pub fn remove_file_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("已刪除暫存檔: {}", path.display()),
        Err(e) => debug!("略過刪除 {}: {e}", path.display()),
    }
}

/// 移動檔案；跨檔案系統時改為複製後刪除
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        warn!("已複製但無法刪除來源檔案 {}: {e}", from.display());
    }
    Ok(())
}

/// 含前導點的副檔名，沒有副檔名時為空字串
#[must_use]
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
