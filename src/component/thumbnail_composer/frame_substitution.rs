use std::path::{Path, PathBuf};

/// 單一幀的擷取結果：預定路徑與是否真的產生了檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSlot {
    pub path: PathBuf,
    pub extracted: bool,
}

impl FrameSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, extracted: bool) -> Self {
        Self {
            path: path.into(),
            extracted,
        }
    }
}

/// 開頭、中段、結尾三個幀位置
///
/// 替代規則依序套用於前一步的結果（不是原始擷取結果），
/// 三幀都失敗時全部收斂到同一個不存在的路徑。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSlots {
    pub start: FrameSlot,
    pub mid: FrameSlot,
    pub end: FrameSlot,
}

impl FrameSlots {
    #[must_use]
    pub const fn new(start: FrameSlot, mid: FrameSlot, end: FrameSlot) -> Self {
        Self { start, mid, end }
    }

    /// 依 start → mid → end 的順序套用替代規則
    #[must_use]
    pub fn resolve(self) -> Self {
        self.substitute_start().substitute_mid().substitute_end()
    }

    /// 開頭缺失：改用中段；中段也缺失時開頭與中段都改用結尾
    #[must_use]
    pub fn substitute_start(self) -> Self {
        if self.start.extracted {
            self
        } else if self.mid.extracted {
            Self {
                start: self.mid.clone(),
                ..self
            }
        } else if self.end.extracted {
            Self {
                start: self.end.clone(),
                mid: self.end.clone(),
                ..self
            }
        } else {
            self
        }
    }

    /// 中段缺失：改用開頭；開頭也缺失時開頭與中段都改用結尾
    #[must_use]
    pub fn substitute_mid(self) -> Self {
        if self.mid.extracted {
            self
        } else if self.start.extracted {
            Self {
                mid: self.start.clone(),
                ..self
            }
        } else {
            Self {
                start: self.end.clone(),
                mid: self.end.clone(),
                ..self
            }
        }
    }

    /// 結尾缺失：改用中段；中段也缺失時中段與結尾都改用開頭
    #[must_use]
    pub fn substitute_end(self) -> Self {
        if self.end.extracted {
            self
        } else if self.mid.extracted {
            Self {
                end: self.mid.clone(),
                ..self
            }
        } else {
            Self {
                mid: self.start.clone(),
                end: self.start.clone(),
                ..self
            }
        }
    }

    #[must_use]
    pub fn paths(&self) -> [&Path; 3] {
        [&self.start.path, &self.mid.path, &self.end.path]
    }

    #[must_use]
    pub const fn all_extracted(&self) -> bool {
        self.start.extracted && self.mid.extracted && self.end.extracted
    }
}
