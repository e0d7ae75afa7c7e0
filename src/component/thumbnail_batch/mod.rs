mod main;

pub use main::{BatchResult, ThumbnailBatch, thumbnail_output_path};
