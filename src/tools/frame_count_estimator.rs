use super::ffprobe_info::{FormatRecord, MediaProbeInfo, StreamRecord};
use crate::error::{MediaError, MediaResult};
use log::debug;
use serde::Serialize;
use std::path::Path;

/// ffprobe 以此標記表示欄位不可用
pub const NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_FRAME_RATE: f64 = 23.976;
pub const DEFAULT_DURATION: f64 = 1.0;

const FORMAT_FRAME_RATE_TAG: &str = "TAG:framerate";

/// 估算影片總幀數
///
/// 順序：
/// 1. `nb_frames`（非 `N/A` 且為整數）
/// 2. 否則以 `duration * frame_rate` 推算，兩者各自有後備來源與預設值
#[must_use]
pub fn estimate_frame_count(stream: &StreamRecord, format: Option<&FormatRecord>) -> u64 {
    if let Some(nb_frames) = stream
        .get("nb_frames")
        .filter(|v| *v != NOT_AVAILABLE)
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        return nb_frames;
    }

    let frame_rate = resolve_frame_rate(stream, format);
    let duration = resolve_duration(stream, format);
    debug!("duration  : {duration}");
    debug!("frame_rate: {frame_rate}");

    let total = (duration * frame_rate).floor();
    if total.is_finite() && total > 0.0 {
        total as u64
    } else {
        0
    }
}

/// 取出視訊串流並估算幀數；沒有視訊串流時回傳 `NoVideoStream`
pub fn estimate_video_frames(info: &MediaProbeInfo, media_path: &Path) -> MediaResult<u64> {
    let stream = info
        .video_stream()
        .ok_or_else(|| MediaError::NoVideoStream {
            path: media_path.to_path_buf(),
        })?;
    Ok(estimate_frame_count(stream, info.format.as_ref()))
}

fn resolve_frame_rate(stream: &StreamRecord, format: Option<&FormatRecord>) -> f64 {
    stream
        .get("r_frame_rate")
        .and_then(parse_frame_rate)
        .or_else(|| {
            format
                .and_then(|f| f.get(FORMAT_FRAME_RATE_TAG))
                .and_then(parse_frame_rate)
        })
        .unwrap_or(DEFAULT_FRAME_RATE)
}

fn resolve_duration(stream: &StreamRecord, format: Option<&FormatRecord>) -> f64 {
    stream
        .get("duration")
        .filter(|d| *d != NOT_AVAILABLE)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .or_else(|| {
            format
                .and_then(|f| f.get("duration"))
                .and_then(|d| d.trim().parse::<f64>().ok())
        })
        .unwrap_or(DEFAULT_DURATION)
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.parse().ok()?;
        let den: f64 = den_str.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate.parse().ok().filter(|r: &f64| r.is_finite())
}

/// 代表影片的三個幀索引
///
/// 索引不做範圍修正，超出範圍時擷取會失敗並交給替代規則處理。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FramePlan {
    pub start: i64,
    pub mid: i64,
    pub end: i64,
}

impl FramePlan {
    #[must_use]
    pub fn from_total_frames(total_frames: u64) -> Self {
        let total = total_frames as f64;
        Self {
            start: (total * 0.10).floor() as i64,
            mid: (total * 0.5).floor() as i64,
            end: (total * 0.90).floor() as i64 - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_fraction() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("24/1").unwrap() - 24.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_decimal() {
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("60").unwrap() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_invalid() {
        assert!(parse_frame_rate("invalid").is_none());
        assert!(parse_frame_rate("0/0").is_none());
        assert!(parse_frame_rate("30/0").is_none());
    }

    #[test]
    fn test_nb_frames_wins_over_everything() {
        let stream = StreamRecord::from([
            ("codec_type", "video"),
            ("nb_frames", "120"),
            ("r_frame_rate", "24/1"),
            ("duration", "9999"),
        ]);
        assert_eq!(estimate_frame_count(&stream, None), 120);
    }

    #[test]
    fn test_rate_times_duration() {
        let stream = StreamRecord::from([("r_frame_rate", "24/1"), ("duration", "10")]);
        assert_eq!(estimate_frame_count(&stream, None), 240);
    }

    #[test]
    fn test_not_available_nb_frames_falls_back() {
        let stream = StreamRecord::from([
            ("nb_frames", NOT_AVAILABLE),
            ("r_frame_rate", "25/1"),
            ("duration", "2"),
        ]);
        assert_eq!(estimate_frame_count(&stream, None), 50);
    }

    #[test]
    fn test_default_frame_rate() {
        let stream = StreamRecord::from([("duration", "1")]);
        assert_eq!(estimate_frame_count(&stream, None), 23);
    }

    #[test]
    fn test_format_frame_rate_tag() {
        let stream = StreamRecord::from([("duration", "2")]);
        let format = FormatRecord::from([("TAG:framerate", "30")]);
        assert_eq!(estimate_frame_count(&stream, Some(&format)), 60);
    }

    #[test]
    fn test_format_duration_fallback() {
        let stream = StreamRecord::from([("r_frame_rate", "10/1"), ("duration", NOT_AVAILABLE)]);
        let format = FormatRecord::from([("duration", "3.55")]);
        assert_eq!(estimate_frame_count(&stream, Some(&format)), 35);
    }

    #[test]
    fn test_default_duration() {
        let stream = StreamRecord::from([("r_frame_rate", "30/1"), ("duration", NOT_AVAILABLE)]);
        assert_eq!(estimate_frame_count(&stream, None), 30);
    }

    #[test]
    fn test_negative_duration_is_zero() {
        let stream = StreamRecord::from([("r_frame_rate", "30/1"), ("duration", "-4")]);
        assert_eq!(estimate_frame_count(&stream, None), 0);
    }

    #[test]
    fn test_estimation_is_deterministic() {
        let stream = StreamRecord::from([("r_frame_rate", "30000/1001"), ("duration", "12.3")]);
        let format = FormatRecord::from([("duration", "12.4")]);
        let first = estimate_frame_count(&stream, Some(&format));
        assert_eq!(first, estimate_frame_count(&stream, Some(&format)));
        assert_eq!(first, 368);
    }

    #[test]
    fn test_no_video_stream() {
        let info = MediaProbeInfo {
            format: None,
            streams: vec![StreamRecord::from([("codec_type", "audio")])],
        };
        let err = estimate_video_frames(&info, Path::new("song.mov")).unwrap_err();
        assert!(matches!(err, MediaError::NoVideoStream { .. }));
    }

    #[test]
    fn test_frame_plan() {
        let plan = FramePlan::from_total_frames(240);
        assert_eq!(plan, FramePlan { start: 24, mid: 120, end: 215 });
    }

    #[test]
    fn test_frame_plan_degenerate() {
        let plan = FramePlan::from_total_frames(0);
        assert_eq!(plan, FramePlan { start: 0, mid: 0, end: -1 });
    }
}
