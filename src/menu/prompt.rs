//! 選單共用的路徑輸入

use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::warn;
use std::path::Path;

/// 從最近使用的路徑中選擇，或輸入新路徑；按 ESC 回傳 `None`
pub fn prompt_path(config: &Config, prompt: &str) -> Result<Option<String>> {
    let recent_paths = &config.settings.recent_paths;

    if recent_paths.is_empty() {
        return input_path(prompt).map(Some);
    }

    let mut options: Vec<String> = recent_paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
            format!("{} [{}] {}", i + 1, indicator, p)
        })
        .collect();
    options.push("輸入新路徑...".to_string());

    println!("{}", style("(按 ESC 返回主選單)").dim());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&options)
        .default(0)
        .interact_opt()?;

    match selection {
        None => Ok(None),
        Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
        Some(_) => input_path(prompt).map(Some),
    }
}

pub fn input_path(prompt: &str) -> Result<String> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(path.trim().to_string())
}

pub fn input_path_with_default(prompt: &str, default: &str) -> Result<String> {
    let path: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(path.trim().to_string())
}

/// 記錄路徑歷史並儲存設定，儲存失敗只記錄警告
pub fn remember_path(config: &mut Config, path: &str) {
    add_recent_path(&mut config.settings, path);
    if let Err(e) = save_settings(&config.settings) {
        warn!("無法儲存路徑歷史: {e}");
    }
}
