//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod artifact_linker;
pub mod media_converter;
pub mod media_manager;
pub mod thumbnail_batch;
pub mod thumbnail_composer;

pub use artifact_linker::{ArtifactLinker, DerivativeLink, DerivativeSource, Repository};
pub use media_converter::MediaConverter;
pub use media_manager::MediaManager;
pub use thumbnail_batch::{BatchResult, ThumbnailBatch};
pub use thumbnail_composer::ThumbnailComposer;
