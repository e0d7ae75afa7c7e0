use crate::tools::ToolArgs;
use std::fmt;
use std::path::{Path, PathBuf};

/// 轉換目標的預設參數
///
/// `input_args` 放在 `-i` 之前，`output_args` 放在之後。
pub trait ConversionPreset {
    /// 輸出副檔名（不含點）
    fn extension(&self) -> &'static str;

    fn input_args(&self) -> ToolArgs {
        ToolArgs::new()
    }

    fn output_args(&self) -> ToolArgs;
}

/// 組裝轉檔參數：輸入端預設、`-i`、輸出端預設，最後套用呼叫端覆寫
///
/// 覆寫已存在的 key 時保留原本位置，只改變其值。
#[must_use]
pub fn build_conversion_args(
    preset: &dyn ConversionPreset,
    input_path: &Path,
    overrides: Option<&ToolArgs>,
) -> ToolArgs {
    let mut args = preset.input_args();
    args.set("i", input_path);
    args.extend(preset.output_args());
    if let Some(overrides) = overrides {
        args.merge(overrides);
    }
    args
}

/// 輸出路徑的副檔名強制改為目標格式
#[must_use]
pub fn conversion_output_path(preset: &dyn ConversionPreset, output_path: &Path) -> PathBuf {
    output_path.with_extension(preset.extension())
}

/// 網頁用 WebM (VP8)，限制位元率並縮小到目標尺寸內
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebVideoPreset {
    pub video_codec: String,
    pub bitrate_kbps: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for WebVideoPreset {
    fn default() -> Self {
        Self {
            video_codec: "libvpx".to_string(),
            bitrate_kbps: 4096,
            max_width: 960,
            max_height: 540,
        }
    }
}

impl ConversionPreset for WebVideoPreset {
    fn extension(&self) -> &'static str {
        "webm"
    }

    fn output_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("vcodec", self.video_codec.as_str())
            .with("b:v", format!("{}k", self.bitrate_kbps))
            .with(
                "vf",
                format!(
                    "scale='min({w},iw)':'min({h},ih)':force_original_aspect_ratio=decrease:force_divisible_by=2",
                    w = self.max_width,
                    h = self.max_height
                ),
            )
    }
}

/// 每幀皆為關鍵幀的 H.264，固定位元率
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H264Preset {
    pub video_codec: String,
    pub profile: String,
    pub gop_size: u32,
    pub bitrate: String,
}

impl Default for H264Preset {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            profile: "main".to_string(),
            gop_size: 1,
            bitrate: "4096k".to_string(),
        }
    }
}

impl ConversionPreset for H264Preset {
    fn extension(&self) -> &'static str {
        "mp4"
    }

    fn output_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("vcodec", self.video_codec.as_str())
            .with("profile:v", self.profile.as_str())
            .with("g", self.gop_size)
            .with("b:v", self.bitrate.as_str())
    }
}

/// Apple ProRes 422 中介檔（輸入可為圖片序列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProresPreset {
    pub probesize: u64,
    pub input_format: String,
    pub profile: u32,
    /// 建議範圍 9 - 13
    pub qscale: u32,
    pub video_codec: String,
    pub vendor: String,
    pub pixel_format: String,
}

impl Default for ProresPreset {
    fn default() -> Self {
        Self {
            probesize: 5_000_000,
            input_format: "image2".to_string(),
            profile: 3,
            qscale: 13,
            video_codec: "prores_ks".to_string(),
            vendor: "ap10".to_string(),
            pixel_format: "yuv422p10le".to_string(),
        }
    }
}

impl ConversionPreset for ProresPreset {
    fn extension(&self) -> &'static str {
        "mov"
    }

    fn input_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("probesize", self.probesize)
            .with("f", self.input_format.as_str())
    }

    fn output_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("profile:v", self.profile)
            .with("qscale:v", self.qscale)
            .with("vcodec", self.video_codec.as_str())
            .with("vendor", self.vendor.as_str())
            .with("pix_fmt", self.pixel_format.as_str())
    }
}

/// Motion JPEG 中介檔（輸入可為圖片序列）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MjpegPreset {
    pub probesize: u64,
    pub input_format: String,
    pub qscale: u32,
    pub video_codec: String,
    pub vendor: String,
    pub pixel_format: String,
}

impl Default for MjpegPreset {
    fn default() -> Self {
        Self {
            probesize: 5_000_000,
            input_format: "image2".to_string(),
            qscale: 1,
            video_codec: "mjpeg".to_string(),
            vendor: "ap10".to_string(),
            pixel_format: "yuv422p".to_string(),
        }
    }
}

impl ConversionPreset for MjpegPreset {
    fn extension(&self) -> &'static str {
        "mov"
    }

    fn input_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("probesize", self.probesize)
            .with("f", self.input_format.as_str())
    }

    fn output_args(&self) -> ToolArgs {
        ToolArgs::new()
            .with("qscale:v", self.qscale)
            .with("vcodec", self.video_codec.as_str())
            .with("vendor", self.vendor.as_str())
            .with("pix_fmt", self.pixel_format.as_str())
    }
}

/// 動態 GIF，只替換路徑
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimatedGifPreset;

impl ConversionPreset for AnimatedGifPreset {
    fn extension(&self) -> &'static str {
        "gif"
    }

    fn output_args(&self) -> ToolArgs {
        ToolArgs::new()
    }
}

/// 可選的轉換目標
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTarget {
    WebVideo,
    H264,
    Prores,
    Mjpeg,
    AnimatedGif,
}

impl ConversionTarget {
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::WebVideo,
            Self::H264,
            Self::Prores,
            Self::Mjpeg,
            Self::AnimatedGif,
        ]
    }

    /// 輸出副檔名（不含點）
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::WebVideo => "webm",
            Self::H264 => "mp4",
            Self::Prores | Self::Mjpeg => "mov",
            Self::AnimatedGif => "gif",
        }
    }
}

/// 與來源同資料夾的 `<stem>_converted.<ext>`
///
/// 主檔名含多個點時保留完整主檔名，不會落到來源旁的其他檔案上。
#[must_use]
pub fn converted_output_path(source: &Path, target: ConversionTarget) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_converted.{}", target.extension()))
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebVideo => write!(f, "WebM (網頁用)"),
            Self::H264 => write!(f, "H.264 (MP4)"),
            Self::Prores => write!(f, "ProRes 422 (MOV)"),
            Self::Mjpeg => write!(f, "Motion JPEG (MOV)"),
            Self::AnimatedGif => write!(f, "動態 GIF"),
        }
    }
}
