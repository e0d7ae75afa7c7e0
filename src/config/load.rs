use crate::config::types::{Config, MediaTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// 編譯時嵌入的媒體類型設定（不需要外部檔案）
const MEDIA_TYPE_TABLE_JSON: &str = include_str!("../data/media_type_table.json");

pub const SETTINGS_FILE: &str = "settings.json";
const FFMPEG_PATH_ENV: &str = "FFMPEG_PATH";
const FFPROBE_PATH_ENV: &str = "FFPROBE_PATH";

impl Config {
    pub fn new() -> Result<Self> {
        let media_type_table = Self::load_embedded_media_type_table()?;
        let mut settings = Self::load_settings(Path::new(SETTINGS_FILE)).unwrap_or_default();
        Self::apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

        Ok(Self {
            media_type_table,
            settings,
        })
    }

    /// 以指定設定建立，不讀取設定檔與環境變數
    pub fn with_settings(settings: UserSettings) -> Result<Self> {
        Ok(Self {
            media_type_table: Self::load_embedded_media_type_table()?,
            settings,
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 環境變數中的工具路徑優先於設定檔
    fn apply_env_overrides(settings: &mut UserSettings, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(FFMPEG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            info!("使用環境變數 {FFMPEG_PATH_ENV}: {path}");
            settings.tools.ffmpeg_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(FFPROBE_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            info!("使用環境變數 {FFPROBE_PATH_ENV}: {path}");
            settings.tools.ffprobe_path = PathBuf::from(path);
        }
    }

    /// 從編譯時嵌入的 JSON 載入媒體類型表
    fn load_embedded_media_type_table() -> Result<MediaTypeTable> {
        serde_json::from_str(MEDIA_TYPE_TABLE_JSON).context("無法解析嵌入的媒體類型設定")
    }
}
