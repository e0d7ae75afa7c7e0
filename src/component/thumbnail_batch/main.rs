//! 批次縮圖
//!
//! 掃描資料夾內所有圖片與影片，平行產生縮圖到輸出資料夾。
//! 單一檔案的縮圖流程本身維持循序執行。

use crate::component::artifact_linker::DerivativeSource;
use crate::config::Config;
use crate::tools::{
    MediaFileInfo, dotted_extension, ensure_directory_exists, move_file, scan_media_files,
    validate_directory_exists,
};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 批次處理結果統計
///
/// 中斷後未處理的檔案不計入 `successful`、`failed`、`skipped`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Skipped,
    Failed,
    Cancelled,
}

/// `<output_dir>/<stem>_thumbnail<extension>`
#[must_use]
pub fn thumbnail_output_path(output_dir: &Path, source: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output_dir.join(format!("{stem}_thumbnail{extension}"))
}

pub struct ThumbnailBatch<'a> {
    source: &'a (dyn DerivativeSource + Sync),
    config: &'a Config,
    shutdown_signal: Arc<AtomicBool>,
    show_progress: bool,
}

impl<'a> ThumbnailBatch<'a> {
    #[must_use]
    pub fn new(
        source: &'a (dyn DerivativeSource + Sync),
        config: &'a Config,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            config,
            shutdown_signal,
            show_progress: true,
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchResult> {
        validate_directory_exists(input_dir)?;
        ensure_directory_exists(output_dir)
            .with_context(|| format!("無法建立輸出資料夾: {}", output_dir.display()))?;

        let files: Vec<MediaFileInfo> =
            scan_media_files(input_dir, &self.config.media_type_table)?
                .into_iter()
                .filter(|file| !file.path.starts_with(output_dir))
                .collect();
        info!("找到 {} 個媒體檔案: {}", files.len(), input_dir.display());

        let progress_bar = self.progress_bar(files.len());
        let outcomes: Vec<Outcome> = files
            .par_iter()
            .map(|file| {
                if self.shutdown_signal.load(Ordering::SeqCst) {
                    return Outcome::Cancelled;
                }
                let outcome = self.process_file(&file.path, output_dir);
                progress_bar.inc(1);
                outcome
            })
            .collect();

        let mut result = BatchResult {
            total: files.len(),
            ..BatchResult::default()
        };
        for outcome in &outcomes {
            match outcome {
                Outcome::Created => result.successful += 1,
                Outcome::Skipped => result.skipped += 1,
                Outcome::Failed => result.failed += 1,
                Outcome::Cancelled => {}
            }
        }

        if outcomes.contains(&Outcome::Cancelled) {
            progress_bar.abandon_with_message("操作已中斷");
            warn!("批次縮圖已中斷");
        } else {
            progress_bar.finish_with_message("完成");
        }

        Ok(result)
    }

    fn process_file(&self, path: &Path, output_dir: &Path) -> Outcome {
        let expected = thumbnail_output_path(output_dir, path, &self.config.settings.thumbnail.format);
        if expected.exists() {
            return Outcome::Skipped;
        }

        let temp_path = match self.source.generate_thumbnail(path) {
            Ok(temp_path) => temp_path,
            Err(e) => {
                error!("縮圖產生失敗 {}: {e}", path.display());
                return Outcome::Failed;
            }
        };

        let destination = thumbnail_output_path(output_dir, path, &dotted_extension(&temp_path));
        match move_file(&temp_path, &destination) {
            Ok(()) => Outcome::Created,
            Err(e) => {
                error!("無法搬移縮圖到 {}: {e}", destination.display());
                Outcome::Failed
            }
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message("產生縮圖中...");
        progress_bar
    }
}
