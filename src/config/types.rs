use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const MAX_RECENT_PATHS: usize = 10;

/// 可接受的媒體種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "圖片"),
            Self::Video => write!(f, "影片"),
        }
    }
}

/// 圖片與影片副檔名表（含前導點）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl MediaTypeTable {
    fn contains(extensions: &[String], extension: &str) -> bool {
        extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// 依最後一段路徑的副檔名分類（不分大小寫）
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))?;

        if Self::contains(&self.image_file, &extension) {
            Some(MediaKind::Image)
        } else if Self::contains(&self.video_file, &extension) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        self.classify(path) == Some(MediaKind::Image)
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        self.classify(path) == Some(MediaKind::Video)
    }
}

/// 外部工具設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// 單次呼叫的逾時秒數，`None` 表示不限制
    pub timeout_secs: Option<u64>,
    /// 覆寫轉檔執行緒數，`None` 時使用主機核心數
    pub threads: Option<usize>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: Some(600),
            threads: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            format: ".jpg".to_string(),
        }
    }
}

/// 網頁瀏覽用版本的目標尺寸與位元率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebMediaSettings {
    pub image_width: u32,
    pub image_height: u32,
    pub image_format: String,
    pub video_width: u32,
    pub video_height: u32,
    pub video_bitrate_kbps: u32,
    pub video_format: String,
}

impl Default for WebMediaSettings {
    fn default() -> Self {
        Self {
            image_width: 1920,
            image_height: 1080,
            image_format: ".jpg".to_string(),
            video_width: 960,
            video_height: 540,
            video_bitrate_kbps: 4096,
            video_format: ".webm".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// 任務參考檔的相對資料夾
    pub reference_path: String,
    /// 版本輸出檔的相對資料夾
    pub version_output_path: String,
    /// 暫存檔目錄，`None` 時使用系統暫存目錄
    pub temp_dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            reference_path: "References/Pipeline".to_string(),
            version_output_path: "Outputs/Pipeline".to_string(),
            temp_dir: None,
        }
    }
}

impl StorageSettings {
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub tools: ToolSettings,
    pub thumbnail: ThumbnailSettings,
    pub web: WebMediaSettings,
    pub storage: StorageSettings,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub media_type_table: MediaTypeTable,
    pub settings: UserSettings,
}
