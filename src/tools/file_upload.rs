//! 上傳檔案落地
//!
//! 將上傳的資料流寫入目標資料夾：整理檔名、避開同名檔案、
//! 先寫入 `~` 暫存檔再改名，避免留下寫到一半的檔案。

use super::path_validator::ensure_directory_exists;
use log::{debug, info};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use uuid::Uuid;

static REGEX_UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\s.\\/:*?"<>|=,+]+"#).expect("Invalid regex"));

/// 土耳其字母轉寫
const CHARACTER_MAP: [(char, char); 12] = [
    ('ç', 'c'),
    ('ğ', 'g'),
    ('ı', 'i'),
    ('ö', 'o'),
    ('ş', 's'),
    ('ü', 'u'),
    ('Ç', 'C'),
    ('Ğ', 'G'),
    ('İ', 'I'),
    ('Ş', 'S'),
    ('Ö', 'O'),
    ('Ü', 'U'),
];

/// 依最後一個點拆分主檔名與副檔名（副檔名含點）
///
/// 以點開頭的隱藏檔名（如 `.bashrc`）沒有副檔名。
fn split_extension(filename: &str) -> (&str, &str) {
    let name_start = filename.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match filename.rfind('.') {
        Some(dot)
            if dot > name_start && !filename[name_start..dot].chars().all(|c| c == '.') =>
        {
            filename.split_at(dot)
        }
        _ => (filename, ""),
    }
}

/// 整理上傳檔名：轉寫特殊字母，主檔名中的空白與不安全字元改為 `_`
#[must_use]
pub fn format_filename(filename: &str) -> String {
    let transliterated: String = filename
        .chars()
        .map(|c| {
            CHARACTER_MAP
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect();

    let (base_name, extension) = split_extension(&transliterated);
    format!(
        "{}{extension}",
        REGEX_UNSAFE_CHARS.replace_all(base_name, "_")
    )
}

/// 在主檔名後加上 `_xxxx`（UUID 前四碼），直到路徑不存在
#[must_use]
pub fn randomize_file_name(full_path: &Path) -> PathBuf {
    let directory = full_path.parent().unwrap_or(Path::new(""));
    let filename = full_path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let (base_name, extension) = split_extension(&filename);

    loop {
        let token = Uuid::new_v4().simple().to_string();
        let candidate = directory.join(format!("{base_name}_{}{extension}", &token[..4]));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// 將資料流寫入 `directory`，回傳最終檔案路徑
///
/// 未提供檔名時使用隨機檔名。
pub fn upload_file(
    reader: &mut impl Read,
    directory: &Path,
    filename: Option<&str>,
) -> io::Result<PathBuf> {
    let filename = filename.map_or_else(
        || Uuid::new_v4().simple().to_string(),
        format_filename,
    );

    let mut full_path = directory.join(&filename);
    if full_path.exists() {
        full_path = randomize_file_name(&full_path);
        debug!("檔名已存在，改用: {}", full_path.display());
    }

    ensure_directory_exists(directory)?;

    let mut temp_os = full_path.clone().into_os_string();
    temp_os.push("~");
    let temp_path = PathBuf::from(temp_os);

    {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        io::copy(reader, &mut writer)?;
        writer.flush()?;
    }

    fs::rename(&temp_path, &full_path)?;
    info!("已上傳檔案: {}", full_path.display());

    Ok(full_path)
}
