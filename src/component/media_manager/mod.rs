//! 媒體衍生檔案分派
//!
//! 依副檔名將原始檔送往圖片或影片流程，產生網頁版本與縮圖。

mod image_derivative;
mod main;

pub use image_derivative::ImageDerivative;
pub use main::MediaManager;
