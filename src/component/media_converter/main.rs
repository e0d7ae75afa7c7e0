use super::conversion_preset::{
    AnimatedGifPreset, ConversionPreset, ConversionTarget, H264Preset, MjpegPreset, ProresPreset,
    WebVideoPreset, build_conversion_args, conversion_output_path,
};
use crate::config::{Config, WebMediaSettings};
use crate::error::MediaResult;
use crate::tools::{ToolArgs, ToolInvocation, ToolOutput, ToolRunner};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 轉檔結果
///
/// 轉檔是否成功由呼叫端檢查 `output_path` 是否存在。
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub output_path: PathBuf,
    pub tool_output: ToolOutput,
}

impl ConversionOutput {
    #[must_use]
    pub fn output_exists(&self) -> bool {
        self.output_path.exists()
    }
}

pub struct MediaConverter {
    runner: Arc<dyn ToolRunner>,
    ffmpeg_path: PathBuf,
    web: WebMediaSettings,
}

impl MediaConverter {
    #[must_use]
    pub fn new(runner: Arc<dyn ToolRunner>, config: &Config) -> Self {
        Self {
            runner,
            ffmpeg_path: config.settings.tools.ffmpeg_path.clone(),
            web: config.settings.web.clone(),
        }
    }

    /// 依預設值轉檔，不重試
    pub fn convert(
        &self,
        preset: &dyn ConversionPreset,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        let output_path = conversion_output_path(preset, output_path);
        let args = build_conversion_args(preset, input_path, overrides);

        info!(
            "轉檔 {} -> {}",
            input_path.display(),
            output_path.display()
        );
        let invocation = ToolInvocation::transcoder(&self.ffmpeg_path, args, Some(&output_path));
        let tool_output = self.runner.run(&invocation)?;

        Ok(ConversionOutput {
            output_path,
            tool_output,
        })
    }

    #[must_use]
    pub fn web_video_preset(&self) -> WebVideoPreset {
        WebVideoPreset {
            bitrate_kbps: self.web.video_bitrate_kbps,
            max_width: self.web.video_width,
            max_height: self.web.video_height,
            ..WebVideoPreset::default()
        }
    }

    pub fn convert_to_webm(
        &self,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        self.convert(&self.web_video_preset(), input_path, output_path, overrides)
    }

    pub fn convert_to_h264(
        &self,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        self.convert(&H264Preset::default(), input_path, output_path, overrides)
    }

    pub fn convert_to_prores(
        &self,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        self.convert(&ProresPreset::default(), input_path, output_path, overrides)
    }

    pub fn convert_to_mjpeg(
        &self,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        self.convert(&MjpegPreset::default(), input_path, output_path, overrides)
    }

    pub fn convert_to_animated_gif(
        &self,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        self.convert(&AnimatedGifPreset, input_path, output_path, overrides)
    }

    pub fn convert_to(
        &self,
        target: ConversionTarget,
        input_path: &Path,
        output_path: &Path,
        overrides: Option<&ToolArgs>,
    ) -> MediaResult<ConversionOutput> {
        match target {
            ConversionTarget::WebVideo => self.convert_to_webm(input_path, output_path, overrides),
            ConversionTarget::H264 => self.convert_to_h264(input_path, output_path, overrides),
            ConversionTarget::Prores => self.convert_to_prores(input_path, output_path, overrides),
            ConversionTarget::Mjpeg => self.convert_to_mjpeg(input_path, output_path, overrides),
            ConversionTarget::AnimatedGif => {
                self.convert_to_animated_gif(input_path, output_path, overrides)
            }
        }
    }
}
