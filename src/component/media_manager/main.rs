use super::image_derivative::ImageDerivative;
use crate::component::artifact_linker::DerivativeSource;
use crate::component::media_converter::MediaConverter;
use crate::component::thumbnail_composer::ThumbnailComposer;
use crate::config::{Config, MediaKind};
use crate::error::{MediaError, MediaResult};
use crate::tools::{
    FramePlan, MediaProbeInfo, ProcessRunner, ToolInvocation, ToolRunner, estimate_video_frames,
    probe_media, temp_file_path,
};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 媒體衍生檔案的入口
///
/// 圖片：縮小後輸出縮圖與網頁版本。
/// 影片：探測 → 估算幀數 → 三幀合成縮圖；網頁版本轉為 WebM。
pub struct MediaManager {
    config: Config,
    runner: Arc<dyn ToolRunner>,
    composer: ThumbnailComposer,
    converter: MediaConverter,
}

impl MediaManager {
    #[must_use]
    pub fn new(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        let composer = ThumbnailComposer::new(Arc::clone(&runner), &config);
        let converter = MediaConverter::new(Arc::clone(&runner), &config);
        Self {
            config,
            runner,
            composer,
            converter,
        }
    }

    /// 依設定建立子程序執行器；收到中斷訊號時會終止執行中的工具
    #[must_use]
    pub fn with_process_runner(config: Config, shutdown_signal: Option<Arc<AtomicBool>>) -> Self {
        let tools = &config.settings.tools;
        let mut runner = ProcessRunner::new(tools.threads)
            .with_timeout(tools.timeout_secs.map(Duration::from_secs));
        if let Some(signal) = shutdown_signal {
            runner = runner.with_shutdown_signal(signal);
        }
        Self::new(config, Arc::new(runner))
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn converter(&self) -> &MediaConverter {
        &self.converter
    }

    pub fn classify(&self, path: &Path) -> MediaResult<MediaKind> {
        self.config
            .media_type_table
            .classify(path)
            .ok_or_else(|| MediaError::UnsupportedMediaType {
                path: path.to_path_buf(),
            })
    }

    /// 產生縮圖，回傳暫存路徑
    pub fn generate_thumbnail(&self, path: &Path) -> MediaResult<PathBuf> {
        match self.classify(path)? {
            MediaKind::Image => self.generate_image_thumbnail(path),
            MediaKind::Video => self.generate_video_thumbnail(path),
        }
    }

    /// 產生網頁瀏覽用版本，回傳暫存路徑
    pub fn generate_media_for_web(&self, path: &Path) -> MediaResult<PathBuf> {
        match self.classify(path)? {
            MediaKind::Image => self.generate_image_for_web(path),
            MediaKind::Video => self.generate_video_for_web(path),
        }
    }

    pub fn probe(&self, path: &Path) -> MediaResult<MediaProbeInfo> {
        probe_media(
            self.runner.as_ref(),
            &self.config.settings.tools.ffprobe_path,
            path,
        )
    }

    /// 探測影片並估算總幀數
    pub fn estimate_frames(&self, path: &Path) -> MediaResult<u64> {
        let info = self.probe(path)?;
        estimate_video_frames(&info, path)
    }

    pub fn generate_video_thumbnail(&self, path: &Path) -> MediaResult<PathBuf> {
        let total_frames = self.estimate_frames(path)?;
        if total_frames == 0 {
            warn!("估算幀數為 0，縮圖可能無法產生: {}", path.display());
        }

        let plan = FramePlan::from_total_frames(total_frames);
        debug!("總幀數 {total_frames}: {plan:?}");
        self.composer.compose(path, plan)
    }

    pub fn generate_video_for_web(&self, path: &Path) -> MediaResult<PathBuf> {
        let web = &self.config.settings.web;
        let temp_path = temp_file_path(&self.config.settings.storage.temp_dir(), &web.video_format);
        let conversion = self.converter.convert_to_webm(path, &temp_path, None)?;

        if !conversion.output_exists() {
            return Err(MediaError::ConversionFailed {
                path: conversion.output_path,
                exit_code: conversion.tool_output.exit_code,
            });
        }

        Ok(conversion.output_path)
    }

    pub fn generate_image_thumbnail(&self, path: &Path) -> MediaResult<PathBuf> {
        let thumbnail = &self.config.settings.thumbnail;
        let derivative = ImageDerivative::new(thumbnail.width, thumbnail.height, &thumbnail.format);
        self.render_image(path, &derivative)
    }

    pub fn generate_image_for_web(&self, path: &Path) -> MediaResult<PathBuf> {
        let web = &self.config.settings.web;
        let derivative = ImageDerivative::new(web.image_width, web.image_height, &web.image_format);
        self.render_image(path, &derivative)
    }

    fn render_image(&self, path: &Path, derivative: &ImageDerivative) -> MediaResult<PathBuf> {
        let output_path = temp_file_path(
            &self.config.settings.storage.temp_dir(),
            &derivative.output_suffix(path),
        );
        let invocation = ToolInvocation::transcoder(
            &self.config.settings.tools.ffmpeg_path,
            derivative.to_args(path),
            Some(&output_path),
        );
        let output = self.runner.run(&invocation)?;

        if !output_path.exists() {
            return Err(MediaError::ConversionFailed {
                path: output_path,
                exit_code: output.exit_code,
            });
        }

        info!("圖片衍生檔已建立: {}", output_path.display());
        Ok(output_path)
    }
}

impl DerivativeSource for MediaManager {
    fn generate_media_for_web(&self, path: &Path) -> MediaResult<PathBuf> {
        Self::generate_media_for_web(self, path)
    }

    fn generate_thumbnail(&self, path: &Path) -> MediaResult<PathBuf> {
        Self::generate_thumbnail(self, path)
    }
}
