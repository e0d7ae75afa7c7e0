use crate::config::{MediaKind, MediaTypeTable};
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct MediaFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub kind: MediaKind,
}

/// 掃描目錄下所有圖片與影片，按大小排序（由小到大）
pub fn scan_media_files(
    directory: &Path,
    media_type_table: &MediaTypeTable,
) -> Result<Vec<MediaFileInfo>> {
    let mut media_files: Vec<MediaFileInfo> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let kind = media_type_table.classify(entry.path())?;
            let metadata = entry.metadata().ok()?;
            Some(MediaFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
                kind,
            })
        })
        .collect();

    media_files.sort_by_key(|file| file.size);
    Ok(media_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_media_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("large.mov"), vec![0u8; 64]).unwrap();
        fs::write(temp_dir.path().join("small.PNG"), vec![0u8; 8]).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), vec![0u8; 4]).unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub").join("mid.mp4"), vec![0u8; 16]).unwrap();

        let table = MediaTypeTable {
            image_file: vec![".png".to_string()],
            video_file: vec![".mov".to_string(), ".mp4".to_string()],
        };
        let files = scan_media_files(temp_dir.path(), &table).unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].kind, MediaKind::Image);
        assert_eq!(files[1].size, 16);
        assert_eq!(files[2].kind, MediaKind::Video);
    }
}
