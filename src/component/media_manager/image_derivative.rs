use crate::tools::ToolArgs;
use std::path::Path;

/// 圖片衍生檔：等比縮小到指定尺寸內，不放大
///
/// GIF 來源維持 GIF 輸出，其他一律使用設定的格式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDerivative {
    pub max_width: u32,
    pub max_height: u32,
    pub format: String,
}

impl ImageDerivative {
    #[must_use]
    pub fn new(max_width: u32, max_height: u32, format: &str) -> Self {
        Self {
            max_width,
            max_height,
            format: format.to_string(),
        }
    }

    /// 輸出副檔名（含點）
    #[must_use]
    pub fn output_suffix(&self, source_path: &Path) -> String {
        let is_gif = source_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
        if is_gif {
            ".gif".to_string()
        } else {
            self.format.clone()
        }
    }

    #[must_use]
    pub fn to_args(&self, source_path: &Path) -> ToolArgs {
        ToolArgs::new()
            .with("i", source_path)
            .with(
                "vf",
                format!(
                    "scale='min({w},iw)':'min({h},ih)':force_original_aspect_ratio=decrease",
                    w = self.max_width,
                    h = self.max_height
                ),
            )
            .with("vframes", 1u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_source_keeps_gif() {
        let derivative = ImageDerivative::new(512, 512, ".jpg");
        assert_eq!(derivative.output_suffix(Path::new("anim.GIF")), ".gif");
        assert_eq!(derivative.output_suffix(Path::new("photo.tiff")), ".jpg");
    }

    #[test]
    fn test_args_limit_size_without_upscaling() {
        let derivative = ImageDerivative::new(1920, 1080, ".jpg");
        assert_eq!(
            derivative.to_args(Path::new("/in/photo.png")).to_flags(),
            vec![
                "-i",
                "/in/photo.png",
                "-vf",
                "scale='min(1920,iw)':'min(1080,ih)':force_original_aspect_ratio=decrease",
                "-vframes",
                "1"
            ]
        );
    }
}
