//! 媒體格式轉換元件
//!
//! 每種目標格式是一個具名欄位的預設值結構，
//! 透過同一個組裝流程轉成 ffmpeg 參數後交給 ToolRunner 執行。

mod conversion_preset;
mod main;

pub use conversion_preset::{
    AnimatedGifPreset, ConversionPreset, ConversionTarget, H264Preset, MjpegPreset, ProresPreset,
    WebVideoPreset, build_conversion_args, conversion_output_path, converted_output_path,
};
pub use main::{ConversionOutput, MediaConverter};
