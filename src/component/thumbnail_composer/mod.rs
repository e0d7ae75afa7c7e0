//! 影片縮圖合成元件
//!
//! 三階段流程：
//! A. 依 FramePlan 各自擷取開頭、中段、結尾三幀
//! B. 擷取失敗的幀以固定順序套用替代規則
//! C. 將三幀疊合成一張縮圖，並刪除暫存幀

mod composite_filter;
mod frame_substitution;
mod main;

pub use composite_filter::build_composite_filter;
pub use frame_substitution::{FrameSlot, FrameSlots};
pub use main::{FrameRequest, ThumbnailComposer};
