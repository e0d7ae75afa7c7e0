use serde::Serialize;
use std::path::{Path, PathBuf};

/// 指向儲存庫內檔案的連結
///
/// 每個連結最多一個縮圖參考；以 `Box` 持有下一層，不會形成循環。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivativeLink {
    /// 相對於儲存庫根目錄、以 `/` 分隔的路徑
    pub full_path: String,
    pub original_filename: String,
    pub thumbnail: Option<Box<DerivativeLink>>,
}

impl DerivativeLink {
    #[must_use]
    pub fn new(full_path: impl Into<String>, original_filename: impl Into<String>) -> Self {
        Self {
            full_path: full_path.into(),
            original_filename: original_filename.into(),
            thumbnail: None,
        }
    }

    pub fn set_thumbnail(&mut self, link: Self) {
        self.thumbnail = Some(Box::new(link));
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&Self> {
        self.thumbnail.as_deref()
    }

    /// 縮圖參考的層數
    #[must_use]
    pub fn chain_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.thumbnail();
        while let Some(link) = current {
            depth += 1;
            current = link.thumbnail();
        }
        depth
    }
}

/// 儲存庫根目錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub root: PathBuf,
}

impl Repository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 轉為相對於根目錄、以 `/` 分隔的路徑；不在根目錄下時保留原路徑
    #[must_use]
    pub fn make_relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}
