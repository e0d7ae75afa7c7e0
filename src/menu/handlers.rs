use super::prompt::{input_path, input_path_with_default, prompt_path, remember_path};
use crate::component::artifact_linker::{ArtifactLinker, Repository, Task};
use crate::component::media_converter::{ConversionTarget, converted_output_path};
use crate::component::thumbnail_batch::{BatchResult, ThumbnailBatch, thumbnail_output_path};
use crate::component::MediaManager;
use crate::config::Config;
use crate::pause;
use crate::tools::{
    FramePlan, dotted_extension, estimate_video_frames, move_file, validate_directory_exists,
};
use anyhow::{Context, Result};
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn report(term: &Term, result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        eprintln!("{} {:#}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

fn media_manager(config: &Config, shutdown_signal: &Arc<AtomicBool>) -> MediaManager {
    MediaManager::with_process_runner(config.clone(), Some(Arc::clone(shutdown_signal)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn run_generate_derivatives(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let result = generate_derivatives(shutdown_signal, config);
    report(term, result)
}

/// 上傳檔案到任務資料夾，產生衍生檔案並顯示連結鏈
fn generate_derivatives(shutdown_signal: &Arc<AtomicBool>, config: &mut Config) -> Result<()> {
    println!("{}", style("=== 上傳參考檔並產生衍生檔案 ===").cyan().bold());

    let source = PathBuf::from(input_path("請輸入來源檔案路徑")?);
    let Some(task_path) = prompt_path(config, "請選擇任務資料夾")? else {
        return Ok(());
    };
    let task_dir = PathBuf::from(&task_path);
    validate_directory_exists(&task_dir)?;
    remember_path(config, &task_path);

    let manager = media_manager(config, shutdown_signal);
    let linker = ArtifactLinker::new(
        Repository::new(&task_dir),
        config.settings.storage.clone(),
    );
    let mut task = Task::new(&file_name(&task_dir), &task_dir);

    let mut reader = File::open(&source)
        .with_context(|| format!("無法開啟來源檔案: {}", source.display()))?;
    let link = linker.upload_reference(&manager, &mut task, &mut reader, Some(&file_name(&source)))?;

    println!("{}", style("連結鏈:").green());
    println!("{}", serde_json::to_string_pretty(&link)?);
    Ok(())
}

pub fn run_single_thumbnail(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let result = single_thumbnail(shutdown_signal, config);
    report(term, result)
}

fn single_thumbnail(shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    println!("{}", style("=== 產生單一縮圖 ===").cyan().bold());

    let source = PathBuf::from(input_path("請輸入來源檔案路徑")?);
    let default_dir = source
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();
    let output_dir = PathBuf::from(input_path_with_default("請輸入輸出資料夾", &default_dir)?);
    validate_directory_exists(&output_dir)?;

    let manager = media_manager(config, shutdown_signal);
    let temp_path = manager.generate_thumbnail(&source)?;
    let destination = thumbnail_output_path(&output_dir, &source, &dotted_extension(&temp_path));
    move_file(&temp_path, &destination)
        .with_context(|| format!("無法搬移縮圖到 {}", destination.display()))?;

    println!("{} {}", style("縮圖已建立:").green(), destination.display());
    Ok(())
}

pub fn run_batch_thumbnails(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let result = batch_thumbnails(shutdown_signal, config);
    report(term, result)
}

fn batch_thumbnails(shutdown_signal: &Arc<AtomicBool>, config: &mut Config) -> Result<()> {
    println!("{}", style("=== 批次產生縮圖 ===").cyan().bold());

    let Some(input) = prompt_path(config, "請選擇媒體資料夾")? else {
        return Ok(());
    };
    let input_dir = PathBuf::from(&input);
    validate_directory_exists(&input_dir)?;
    remember_path(config, &input);

    let default_output = input_dir.join("thumbnails").to_string_lossy().to_string();
    let output_dir = PathBuf::from(input_path_with_default("請輸入輸出資料夾", &default_output)?);

    let manager = media_manager(config, shutdown_signal);
    let result = ThumbnailBatch::new(&manager, config, Arc::clone(shutdown_signal))
        .run(&input_dir, &output_dir)?;
    print_batch_result(&result);
    Ok(())
}

fn print_batch_result(result: &BatchResult) {
    println!();
    println!("{}", style("=== 批次縮圖結果 ===").cyan().bold());
    println!("  總數: {} 個", result.total);
    println!("  成功: {} 個", style(result.successful).green());
    if result.skipped > 0 {
        println!("  跳過: {} 個", style(result.skipped).yellow());
    }
    if result.failed > 0 {
        println!("  失敗: {} 個", style(result.failed).red());
    }
}

pub fn run_probe_info(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let result = probe_info(shutdown_signal, config);
    report(term, result)
}

/// 顯示探測結果、估算幀數與縮圖幀
fn probe_info(shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    println!("{}", style("=== 媒體資訊 ===").cyan().bold());

    let source = PathBuf::from(input_path("請輸入影片路徑")?);
    let manager = media_manager(config, shutdown_signal);
    let info = manager.probe(&source)?;

    println!("  串流數: {}", info.streams.len());
    if let Some(format) = &info.format {
        println!("{}", style("格式:").dim());
        println!("{}", serde_json::to_string_pretty(format)?);
    }
    let Some(stream) = info.video_stream() else {
        println!("{}", style("找不到視訊串流").yellow());
        return Ok(());
    };
    println!("{}", style("視訊串流:").dim());
    println!("{}", serde_json::to_string_pretty(stream)?);

    let total_frames = estimate_video_frames(&info, &source)?;
    let plan = FramePlan::from_total_frames(total_frames);
    println!(
        "\n  估算幀數: {}\n  縮圖幀: start={} mid={} end={}",
        style(total_frames).green(),
        plan.start,
        plan.mid,
        plan.end
    );
    Ok(())
}

pub fn run_convert(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let result = convert(shutdown_signal, config);
    report(term, result)
}

fn convert(shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    println!("{}", style("=== 格式轉換 ===").cyan().bold());

    let source = PathBuf::from(input_path("請輸入來源檔案路徑")?);
    let targets = ConversionTarget::all();
    let items: Vec<String> = targets.iter().map(ToString::to_string).collect();

    let Some(selection) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇目標格式")
        .items(&items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };

    let target = targets[selection];
    let output_path = converted_output_path(&source, target);

    let manager = media_manager(config, shutdown_signal);
    let conversion = manager
        .converter()
        .convert_to(target, &source, &output_path, None)?;

    if conversion.output_exists() {
        println!(
            "{} {}",
            style("轉換完成:").green(),
            conversion.output_path.display()
        );
    } else {
        println!(
            "{} (exit code {:?})",
            style("轉換失敗，未產生輸出").red(),
            conversion.tool_output.exit_code
        );
    }
    Ok(())
}
