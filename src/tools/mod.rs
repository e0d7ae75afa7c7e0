mod ffprobe_info;
mod file_tools;
mod file_upload;
mod frame_count_estimator;
mod media_scanner;
mod path_validator;
mod process_runner;

pub use ffprobe_info::{
    FormatRecord, MediaProbeInfo, ProbeRecord, StreamRecord, parse_format_record,
    parse_stream_records, probe_media,
};
pub use file_tools::{dotted_extension, move_file, remove_file_quietly, temp_file_path};
pub use file_upload::{format_filename, randomize_file_name, upload_file};
pub use frame_count_estimator::{
    DEFAULT_DURATION, DEFAULT_FRAME_RATE, FramePlan, NOT_AVAILABLE, estimate_frame_count,
    estimate_video_frames, parse_frame_rate,
};
pub use media_scanner::{MediaFileInfo, scan_media_files};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use process_runner::{
    ArgValue, CaptureStream, ProcessRunner, ToolArgs, ToolInvocation, ToolOutput, ToolRunner,
    is_still_image,
};
