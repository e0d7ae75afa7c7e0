use super::process_runner::{ToolArgs, ToolInvocation, ToolRunner};
use crate::error::MediaResult;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const STREAM_SECTION: &str = "STREAM";
const FORMAT_SECTION: &str = "FORMAT";

/// ffprobe 區塊中的 `key=value` 欄位
///
/// 不認得的欄位原樣保留。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProbeRecord {
    fields: BTreeMap<String, String>,
}

/// 單一 `[STREAM]` 區塊
pub type StreamRecord = ProbeRecord;
/// `[FORMAT]` 區塊
pub type FormatRecord = ProbeRecord;

impl ProbeRecord {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ProbeRecord {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut record = Self::default();
        for (key, value) in pairs {
            record.insert(key, value);
        }
        record
    }
}

/// 媒體檔的探測結果
///
/// `streams` 可以是空的；找不到視訊串流與幀數為 0 是兩種不同狀況。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaProbeInfo {
    pub format: Option<FormatRecord>,
    pub streams: Vec<StreamRecord>,
}

impl MediaProbeInfo {
    /// 由兩次 ffprobe 呼叫（`-show_streams`、`-show_format`）的輸出組成
    #[must_use]
    pub fn from_probe_output(stream_lines: &[impl AsRef<str>], format_lines: &[impl AsRef<str>]) -> Self {
        Self {
            format: parse_format_record(format_lines),
            streams: parse_stream_records(stream_lines),
        }
    }

    /// 第一個 `codec_type=video` 的串流
    #[must_use]
    pub fn video_stream(&self) -> Option<&StreamRecord> {
        self.streams
            .iter()
            .find(|stream| stream.get("codec_type") == Some("video"))
    }
}

/// 解析所有完整的 `[STREAM]...[/STREAM]` 區塊，依出現順序
#[must_use]
pub fn parse_stream_records(lines: &[impl AsRef<str>]) -> Vec<StreamRecord> {
    parse_sections(lines, STREAM_SECTION)
}

/// 解析 `[FORMAT]...[/FORMAT]` 區塊；多個區塊時以最後一個為準
#[must_use]
pub fn parse_format_record(lines: &[impl AsRef<str>]) -> Option<FormatRecord> {
    parse_sections(lines, FORMAT_SECTION).pop()
}

/// 區塊掃描：區塊內沒有 `=` 的行會被忽略，
/// 行數用盡時仍未關閉的區塊會被捨棄。
fn parse_sections(lines: &[impl AsRef<str>], section: &str) -> Vec<ProbeRecord> {
    let open = format!("[{section}]");
    let close = format!("[/{section}]");

    let mut records = Vec::new();
    let mut current: Option<ProbeRecord> = None;

    for raw in lines {
        let line = raw.as_ref().trim();
        match current.as_mut() {
            None => {
                if line == open {
                    current = Some(ProbeRecord::default());
                }
            }
            Some(record) => {
                if line == close {
                    records.extend(current.take());
                } else if let Some((key, value)) = line.split_once('=') {
                    record.insert(key, value);
                }
            }
        }
    }

    if current.is_some() {
        warn!("ffprobe 輸出中的 {open} 區塊未結束，已忽略");
    }

    records
}

/// 以兩次獨立的 ffprobe 呼叫取得串流與容器資訊
pub fn probe_media(
    runner: &dyn ToolRunner,
    ffprobe_path: &Path,
    media_path: &Path,
) -> MediaResult<MediaProbeInfo> {
    let streams = ToolInvocation::prober(
        ffprobe_path,
        ToolArgs::new().with("show_streams", media_path),
    );
    let stream_output = runner.run(&streams)?.into_result(&streams.tool_name())?;

    let format = ToolInvocation::prober(
        ffprobe_path,
        ToolArgs::new().with("show_format", media_path),
    );
    let format_output = runner.run(&format)?.into_result(&format.tool_name())?;

    let info = MediaProbeInfo::from_probe_output(&stream_output.lines, &format_output.lines);
    debug!(
        "探測 {}: {} 個串流, format 區塊 {}",
        media_path.display(),
        info.streams.len(),
        if info.format.is_some() { "存在" } else { "不存在" }
    );

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAMS: &str = "\
[STREAM]
index=0
codec_name=h264
codec_type=video
r_frame_rate=24/1
nb_frames=240
TAG:encoder=x264 core=1
[/STREAM]
[STREAM]
index=1
codec_type=audio
[/STREAM]
";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_parse_stream_records_in_order() {
        let streams = parse_stream_records(&lines(STREAMS));
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].get("codec_name"), Some("h264"));
        assert_eq!(streams[1].get("codec_type"), Some("audio"));
    }

    #[test]
    fn test_split_on_first_equals() {
        let streams = parse_stream_records(&lines(STREAMS));
        assert_eq!(streams[0].get("TAG:encoder"), Some("x264 core=1"));
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        let text = format!("{STREAMS}[STREAM]\ncodec_type=video\nnb_frames=9\n");
        let streams = parse_stream_records(&lines(&text));
        assert_eq!(streams.len(), 2);
    }

    #[test]
    fn test_unterminated_format_block_is_dropped() {
        let text = "[FORMAT]\nduration=12.5\nsize=1024\n";
        assert!(parse_format_record(&lines(text)).is_none());

        // 完整區塊之後的未關閉區塊不會覆蓋前者
        let text = "[FORMAT]\nduration=1\n[/FORMAT]\n[FORMAT]\nduration=2\n";
        let format = parse_format_record(&lines(text)).unwrap();
        assert_eq!(format.get("duration"), Some("1"));
    }

    #[test]
    fn test_lines_outside_blocks_and_without_equals_are_ignored() {
        let text = "garbage=1\n[STREAM]\nno equals here\ncodec_type=video\n[/STREAM]\ntrailing=2\n";
        let streams = parse_stream_records(&lines(text));
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].len(), 1);
    }

    #[test]
    fn test_lines_with_line_endings_are_trimmed() {
        let raw = vec!["[FORMAT]\r\n", "duration=12.5\n", "[/FORMAT]\n"];
        let format = parse_format_record(&raw).unwrap();
        assert_eq!(format.get("duration"), Some("12.5"));
    }

    #[test]
    fn test_last_format_block_wins() {
        let text = "[FORMAT]\nduration=1\n[/FORMAT]\n[FORMAT]\nduration=2\n[/FORMAT]\n";
        let format = parse_format_record(&lines(text)).unwrap();
        assert_eq!(format.get("duration"), Some("2"));
    }

    #[test]
    fn test_empty_output_has_no_streams() {
        let info = MediaProbeInfo::from_probe_output(&Vec::<String>::new(), &Vec::<String>::new());
        assert!(info.streams.is_empty());
        assert!(info.format.is_none());
        assert!(info.video_stream().is_none());
    }

    #[test]
    fn test_video_stream_is_first_video_record() {
        let text = "[STREAM]\ncodec_type=audio\n[/STREAM]\n[STREAM]\ncodec_type=video\nindex=1\n[/STREAM]\n[STREAM]\ncodec_type=video\nindex=2\n[/STREAM]\n";
        let info = MediaProbeInfo::from_probe_output(&lines(text), &Vec::<String>::new());
        assert_eq!(info.video_stream().and_then(|s| s.get("index")), Some("1"));
    }
}
