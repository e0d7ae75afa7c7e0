//! 媒體衍生檔案流程的錯誤類型
//!
//! 結構性錯誤（不支援的類型、找不到視訊串流）直接回傳給呼叫端；
//! 單一幀擷取失敗與單一衍生檔案失敗不會出現在這裡，而是在流程內降級處理。

use std::path::PathBuf;
use std::time::Duration;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("{} 不是圖片也不是影片，無法產生衍生檔案", path.display())]
    UnsupportedMediaType { path: PathBuf },

    #[error("找不到視訊串流: {}", path.display())]
    NoVideoStream { path: PathBuf },

    #[error("{tool} 執行失敗 (exit code {exit_code:?})")]
    ToolInvocationFailure {
        tool: String,
        exit_code: Option<i32>,
        output: Vec<String>,
    },

    #[error("無法執行 {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} 執行逾時 ({timeout:?})，已終止")]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("{tool} 已因中斷訊號終止")]
    Cancelled { tool: String },

    #[error("縮圖合成失敗，未產生輸出: {} (exit code {exit_code:?})", path.display())]
    CompositeFailed {
        path: PathBuf,
        exit_code: Option<i32>,
    },

    #[error("轉檔失敗，未產生輸出: {} (exit code {exit_code:?})", path.display())]
    ConversionFailed {
        path: PathBuf,
        exit_code: Option<i32>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// 單一衍生檔案沒有產生：上傳流程記錄警告後視為缺少該衍生檔案
    ///
    /// 中斷、無法啟動工具、找不到視訊串流與 I/O 錯誤不在此列，會直接回傳。
    #[must_use]
    pub const fn is_missing_derivative(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMediaType { .. }
                | Self::ToolInvocationFailure { .. }
                | Self::ToolTimeout { .. }
                | Self::CompositeFailed { .. }
                | Self::ConversionFailed { .. }
        )
    }
}
