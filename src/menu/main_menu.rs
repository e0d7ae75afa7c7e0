use crate::config::Config;
use crate::config::save::save_settings;
use crate::menu::handlers::{
    run_batch_thumbnails, run_convert, run_generate_derivatives, run_probe_info,
    run_single_thumbnail,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 媒體衍生檔案工具 ===").cyan().bold());
    println!("{}", style("(按 ESC 離開)").dim());

    let options = [
        "上傳參考檔並產生衍生檔案",
        "產生單一縮圖",
        "批次產生縮圖",
        "顯示媒體資訊與縮圖幀",
        "格式轉換",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_generate_derivatives(term, shutdown_signal, config)?,
        Some(1) => run_single_thumbnail(term, shutdown_signal, config)?,
        Some(2) => run_batch_thumbnails(term, shutdown_signal, config)?,
        Some(3) => run_probe_info(term, shutdown_signal, config)?,
        Some(4) => run_convert(term, shutdown_signal, config)?,
        Some(5) => show_settings_menu(term, config)?,
        Some(6) | None => return Ok(false),
        _ => unreachable!(),
    }

    Ok(true)
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("(按 ESC 返回)").dim());
        println!(
            "\n{} ffmpeg={} ffprobe={}",
            style("工具:").dim(),
            config.settings.tools.ffmpeg_path.display(),
            config.settings.tools.ffprobe_path.display()
        );
        println!(
            "{} {}x{} {}\n",
            style("縮圖:").dim(),
            config.settings.thumbnail.width,
            config.settings.thumbnail.height,
            config.settings.thumbnail.format
        );

        let options = ["工具路徑", "縮圖尺寸", "返回"];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇設定項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_tool_settings_menu(config)?,
            Some(1) => show_thumbnail_settings_menu(config)?,
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn show_tool_settings_menu(config: &mut Config) -> Result<()> {
    let tools = &config.settings.tools;
    let ffmpeg: String = Input::new()
        .with_prompt("ffmpeg 路徑")
        .default(tools.ffmpeg_path.to_string_lossy().to_string())
        .interact_text()?;
    let ffprobe: String = Input::new()
        .with_prompt("ffprobe 路徑")
        .default(tools.ffprobe_path.to_string_lossy().to_string())
        .interact_text()?;

    config.settings.tools.ffmpeg_path = PathBuf::from(ffmpeg.trim());
    config.settings.tools.ffprobe_path = PathBuf::from(ffprobe.trim());
    save_and_notify(config)
}

fn show_thumbnail_settings_menu(config: &mut Config) -> Result<()> {
    let thumbnail = &config.settings.thumbnail;
    let width: u32 = Input::new()
        .with_prompt("縮圖寬度")
        .default(thumbnail.width)
        .interact_text()?;
    let height: u32 = Input::new()
        .with_prompt("縮圖高度")
        .default(thumbnail.height)
        .interact_text()?;

    config.settings.thumbnail.width = width;
    config.settings.thumbnail.height = height;
    save_and_notify(config)
}

fn save_and_notify(config: &Config) -> Result<()> {
    save_settings(&config.settings)?;
    println!("\n{}", style("設定已儲存").green());
    std::thread::sleep(std::time::Duration::from_secs(1));
    Ok(())
}
