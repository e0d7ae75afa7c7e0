use super::derivative_link::DerivativeLink;
use std::path::{Path, PathBuf};

/// 擁有連結鏈根節點的容器
pub trait LinkOwner {
    fn absolute_path(&self) -> &Path;

    /// 加入根連結，之後整條鏈由容器擁有
    fn attach(&mut self, link: DerivativeLink);
}

/// 任務：上傳的參考檔掛在 `references`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub absolute_path: PathBuf,
    pub references: Vec<DerivativeLink>,
}

impl Task {
    #[must_use]
    pub fn new(name: &str, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            absolute_path: absolute_path.into(),
            references: Vec::new(),
        }
    }
}

impl LinkOwner for Task {
    fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    fn attach(&mut self, link: DerivativeLink) {
        self.references.push(link);
    }
}

/// 版本：上傳的輸出檔掛在 `outputs`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub absolute_path: PathBuf,
    pub outputs: Vec<DerivativeLink>,
}

impl Version {
    #[must_use]
    pub fn new(absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            outputs: Vec::new(),
        }
    }
}

impl LinkOwner for Version {
    fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    fn attach(&mut self, link: DerivativeLink) {
        self.outputs.push(link);
    }
}
