use super::composite_filter::build_composite_filter;
use super::frame_substitution::{FrameSlot, FrameSlots};
use crate::config::{Config, ThumbnailSettings};
use crate::error::{MediaError, MediaResult};
use crate::tools::{
    FramePlan, ToolArgs, ToolInvocation, ToolRunner, remove_file_quietly, temp_file_path,
};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 單一幀的擷取請求
///
/// 開頭幀選取第 0 幀並要求 `start` 幀數，中段與結尾各選取指定索引的 1 幀。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub select_index: i64,
    pub vframes: i64,
}

impl FrameRequest {
    #[must_use]
    pub const fn plan(plan: FramePlan) -> [Self; 3] {
        [
            Self {
                select_index: 0,
                vframes: plan.start,
            },
            Self {
                select_index: plan.mid,
                vframes: 1,
            },
            Self {
                select_index: plan.end,
                vframes: 1,
            },
        ]
    }

    #[must_use]
    pub fn to_args(self, video_path: &Path) -> ToolArgs {
        ToolArgs::new()
            .with("i", video_path)
            .with("vf", format!("select='eq(n,{})'", self.select_index))
            .with("vframes", self.vframes)
    }
}

/// 暫存幀檔案；離開作用域時一律刪除
struct TempFrames {
    paths: [PathBuf; 3],
}

impl TempFrames {
    fn new(temp_dir: &Path, suffix: &str) -> Self {
        Self {
            paths: [
                temp_file_path(temp_dir, suffix),
                temp_file_path(temp_dir, suffix),
                temp_file_path(temp_dir, suffix),
            ],
        }
    }
}

impl Drop for TempFrames {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_file_quietly(path);
        }
    }
}

/// 影片縮圖合成器
pub struct ThumbnailComposer {
    runner: Arc<dyn ToolRunner>,
    ffmpeg_path: PathBuf,
    thumbnail: ThumbnailSettings,
    temp_dir: PathBuf,
}

impl ThumbnailComposer {
    #[must_use]
    pub fn new(runner: Arc<dyn ToolRunner>, config: &Config) -> Self {
        Self {
            runner,
            ffmpeg_path: config.settings.tools.ffmpeg_path.clone(),
            thumbnail: config.settings.thumbnail.clone(),
            temp_dir: config.settings.storage.temp_dir(),
        }
    }

    /// 擷取三幀並合成縮圖，回傳縮圖暫存路徑
    pub fn compose(&self, video_path: &Path, plan: FramePlan) -> MediaResult<PathBuf> {
        debug!(
            "縮圖幀: start={}, mid={}, end={} ({})",
            plan.start,
            plan.mid,
            plan.end,
            video_path.display()
        );

        let frames = TempFrames::new(&self.temp_dir, &self.thumbnail.format);
        let slots = self.extract_frames(video_path, plan, &frames)?;
        if !slots.all_extracted() {
            warn!(
                "部分幀擷取失敗 (start={}, mid={}, end={})，套用替代幀: {}",
                slots.start.extracted,
                slots.mid.extracted,
                slots.end.extracted,
                video_path.display()
            );
        }

        let resolved = slots.resolve();
        let thumbnail_path = temp_file_path(&self.temp_dir, &self.thumbnail.format);
        let result = self.composite(&resolved, &thumbnail_path);
        drop(frames);

        let exit_code = match result {
            Ok(exit_code) => exit_code,
            Err(e) => {
                remove_file_quietly(&thumbnail_path);
                return Err(e);
            }
        };
        if !thumbnail_path.exists() {
            return Err(MediaError::CompositeFailed {
                path: thumbnail_path,
                exit_code,
            });
        }

        info!(
            "縮圖已建立: {} -> {}",
            video_path.display(),
            thumbnail_path.display()
        );
        Ok(thumbnail_path)
    }

    /// 依序擷取三幀，不平行處理
    fn extract_frames(
        &self,
        video_path: &Path,
        plan: FramePlan,
        frames: &TempFrames,
    ) -> MediaResult<FrameSlots> {
        let [start, mid, end] = FrameRequest::plan(plan);
        Ok(FrameSlots::new(
            self.extract_frame(video_path, start, &frames.paths[0])?,
            self.extract_frame(video_path, mid, &frames.paths[1])?,
            self.extract_frame(video_path, end, &frames.paths[2])?,
        ))
    }

    /// 擷取單一幀；沒有產生輸出檔不算錯誤，只標記為未擷取
    fn extract_frame(
        &self,
        video_path: &Path,
        request: FrameRequest,
        output_path: &Path,
    ) -> MediaResult<FrameSlot> {
        let invocation = ToolInvocation::transcoder(
            &self.ffmpeg_path,
            request.to_args(video_path),
            Some(output_path),
        );

        match self.runner.run(&invocation) {
            Ok(_) => {}
            Err(MediaError::ToolTimeout { tool, timeout }) => {
                warn!("{tool} 擷取第 {} 幀逾時 ({timeout:?})", request.select_index);
            }
            Err(e) => return Err(e),
        }

        let extracted = output_path.exists();
        if !extracted {
            debug!("第 {} 幀未產生輸出", request.select_index);
        }
        Ok(FrameSlot::new(output_path, extracted))
    }

    /// 執行合成，回傳工具結束碼
    fn composite(&self, slots: &FrameSlots, thumbnail_path: &Path) -> MediaResult<Option<i32>> {
        let inputs: Vec<String> = slots
            .paths()
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        let args = ToolArgs::new().with("i", inputs).with(
            "filter_complex",
            build_composite_filter(self.thumbnail.width, self.thumbnail.height),
        );

        let invocation = ToolInvocation::transcoder(&self.ffmpeg_path, args, Some(thumbnail_path));
        let output = self.runner.run(&invocation)?;
        Ok(output.exit_code)
    }
}
