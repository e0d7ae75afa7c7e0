//! 衍生檔案連結元件
//!
//! 原始檔 → 網頁版本 → 縮圖 串成單向連結鏈，根節點由任務參考清單或版本輸出清單擁有。

mod derivative_link;
mod link_owner;
mod main;

pub use derivative_link::{DerivativeLink, Repository};
pub use link_owner::{LinkOwner, Task, Version};
pub use main::{
    ArtifactLinker, DerivativeFiles, DerivativeSource, THUMBNAIL_FOLDER, WEB_VERSION_FOLDER,
};
