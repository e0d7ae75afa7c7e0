//! 整合測試 - 以假的 ToolRunner 驗證完整流程
//!
//! 假執行器記錄每次呼叫，並依規則決定是否建立輸出檔。

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use media_derivatives::component::artifact_linker::{ArtifactLinker, Repository, Task, Version};
use media_derivatives::component::MediaManager;
use media_derivatives::config::{Config, UserSettings};
use media_derivatives::tools::{ArgValue, ToolInvocation, ToolOutput, ToolRunner};
use media_derivatives::{MediaError, MediaResult};
use tempfile::TempDir;

const VIDEO_STREAM: &[&str] = &[
    "[STREAM]",
    "index=0",
    "codec_name=h264",
    "codec_type=video",
    "r_frame_rate=24/1",
    "duration=10.000000",
    "nb_frames=240",
    "[/STREAM]",
    "[STREAM]",
    "index=1",
    "codec_type=audio",
    "[/STREAM]",
];

const AUDIO_ONLY_STREAM: &[&str] = &["[STREAM]", "index=0", "codec_type=audio", "[/STREAM]"];

const FORMAT: &[&str] = &["[FORMAT]", "duration=10.000000", "[/FORMAT]"];

type FailRule = Box<dyn Fn(&ToolInvocation) -> bool + Send + Sync>;

struct FakeRunner {
    stream_lines: Vec<String>,
    format_lines: Vec<String>,
    skip_output: FailRule,
    time_out: FailRule,
    invocations: Mutex<Vec<ToolInvocation>>,
}

impl FakeRunner {
    fn new(stream_lines: &[&str]) -> Self {
        Self {
            stream_lines: stream_lines.iter().map(ToString::to_string).collect(),
            format_lines: FORMAT.iter().map(ToString::to_string).collect(),
            skip_output: Box::new(|_| false),
            time_out: Box::new(|_| false),
            invocations: Mutex::new(Vec::new()),
        }
    }

    fn skipping(mut self, rule: impl Fn(&ToolInvocation) -> bool + Send + Sync + 'static) -> Self {
        self.skip_output = Box::new(rule);
        self
    }

    /// 符合規則的呼叫先寫出部分輸出再回報逾時
    fn timing_out(mut self, rule: impl Fn(&ToolInvocation) -> bool + Send + Sync + 'static) -> Self {
        self.time_out = Box::new(rule);
        self
    }

    fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn composite_inputs(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .find(|inv| inv.args.get("filter_complex").is_some())
            .and_then(|inv| match inv.args.get("i") {
                Some(ArgValue::Multi(values)) => Some(values.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &ToolInvocation) -> MediaResult<ToolOutput> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let lines = if invocation.args.get("show_streams").is_some() {
            self.stream_lines.clone()
        } else if invocation.args.get("show_format").is_some() {
            self.format_lines.clone()
        } else {
            Vec::new()
        };

        let mut succeeded = true;
        if let Some(output) = &invocation.output {
            if (self.time_out)(invocation) {
                fs::write(output, b"partial")?;
                return Err(MediaError::ToolTimeout {
                    tool: invocation.tool_name(),
                    timeout: Duration::from_secs(1),
                });
            }
            if (self.skip_output)(invocation) {
                succeeded = false;
            } else {
                fs::write(output, b"fake")?;
            }
        }

        Ok(ToolOutput {
            succeeded,
            exit_code: Some(if succeeded { 0 } else { 1 }),
            lines,
        })
    }
}

fn select_filter(invocation: &ToolInvocation) -> Option<String> {
    match invocation.args.get("vf") {
        Some(ArgValue::Single(value)) if value.starts_with("select=") => Some(value.clone()),
        _ => None,
    }
}

fn is_frame(invocation: &ToolInvocation, index: i64) -> bool {
    select_filter(invocation).as_deref() == Some(format!("select='eq(n,{index})'").as_str())
}

fn config(temp_dir: &Path) -> Config {
    let mut settings = UserSettings::default();
    settings.storage.temp_dir = Some(temp_dir.to_path_buf());
    Config::with_settings(settings).unwrap()
}

fn manager(temp_dir: &Path, runner: &Arc<FakeRunner>) -> MediaManager {
    let runner: Arc<dyn ToolRunner> = Arc::clone(runner) as Arc<dyn ToolRunner>;
    MediaManager::new(config(temp_dir), runner)
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

#[test]
fn test_video_thumbnail_pipeline() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    let thumbnail = manager.generate_thumbnail(Path::new("/media/shot.mov")).unwrap();

    assert!(thumbnail.exists());
    assert_eq!(thumbnail.extension().unwrap(), "jpg");
    // 暫存幀已刪除，只剩縮圖
    assert_eq!(files_in(temp.path()), vec![thumbnail.clone()]);

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 2 + 3 + 1);
    assert!(is_frame(&invocations[2], 0));
    assert!(is_frame(&invocations[3], 120));
    assert!(is_frame(&invocations[4], 215));
    assert_eq!(
        invocations[2].args.get("vframes"),
        Some(&ArgValue::Single("24".to_string()))
    );

    let inputs = runner.composite_inputs();
    assert_eq!(inputs.len(), 3);
    assert_ne!(inputs[0], inputs[1]);
    assert_ne!(inputs[1], inputs[2]);
}

#[test]
fn test_missing_start_frame_uses_mid() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM).skipping(|inv| is_frame(inv, 0)));
    let manager = manager(temp.path(), &runner);

    let thumbnail = manager.generate_thumbnail(Path::new("/media/shot.mov")).unwrap();
    assert!(thumbnail.exists());

    let frame_outputs: Vec<String> = runner
        .invocations()
        .iter()
        .filter(|inv| select_filter(inv).is_some())
        .map(|inv| inv.output.as_ref().unwrap().to_string_lossy().to_string())
        .collect();
    let inputs = runner.composite_inputs();
    assert_eq!(
        inputs,
        vec![
            frame_outputs[1].clone(),
            frame_outputs[1].clone(),
            frame_outputs[2].clone()
        ]
    );
}

#[test]
fn test_all_frames_missing_fails_composite() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM).skipping(|_| true));
    let manager = manager(temp.path(), &runner);

    let result = manager.generate_thumbnail(Path::new("/media/shot.mov"));
    assert!(matches!(result, Err(MediaError::CompositeFailed { .. })));

    let inputs = runner.composite_inputs();
    assert_eq!(inputs.len(), 3);
    assert!(inputs.iter().all(|p| p == &inputs[0]));
    assert!(files_in(temp.path()).is_empty());
}

#[test]
fn test_composite_timeout_removes_partial_thumbnail() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(
        FakeRunner::new(VIDEO_STREAM).timing_out(|inv| inv.args.get("filter_complex").is_some()),
    );
    let manager = manager(temp.path(), &runner);

    let result = manager.generate_thumbnail(Path::new("/media/shot.mov"));
    assert!(matches!(result, Err(MediaError::ToolTimeout { .. })));
    assert!(files_in(temp.path()).is_empty());
}

#[test]
fn test_no_video_stream() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(AUDIO_ONLY_STREAM));
    let manager = manager(temp.path(), &runner);

    let result = manager.generate_thumbnail(Path::new("/media/voice.mp4"));
    assert!(matches!(result, Err(MediaError::NoVideoStream { .. })));
    assert_eq!(runner.invocations().len(), 2);
}

#[test]
fn test_unsupported_media_type() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    for path in ["/docs/notes.txt", "/docs/noextension"] {
        assert!(matches!(
            manager.generate_thumbnail(Path::new(path)),
            Err(MediaError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            manager.generate_media_for_web(Path::new(path)),
            Err(MediaError::UnsupportedMediaType { .. })
        ));
    }
    assert!(runner.invocations().is_empty());
}

#[test]
fn test_video_web_version() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    let web = manager.generate_media_for_web(Path::new("/media/shot.mov")).unwrap();
    assert_eq!(web.extension().unwrap(), "webm");
    assert!(web.exists());

    let invocations = runner.invocations();
    assert_eq!(invocations.len(), 1);
    let args = &invocations[0].args;
    assert_eq!(args.get("vcodec"), Some(&ArgValue::Single("libvpx".to_string())));
    assert_eq!(args.get("b:v"), Some(&ArgValue::Single("4096k".to_string())));
}

#[test]
fn test_video_web_version_without_output() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM).skipping(|_| true));
    let manager = manager(temp.path(), &runner);

    let result = manager.generate_media_for_web(Path::new("/media/shot.mov"));
    assert!(matches!(result, Err(MediaError::ConversionFailed { .. })));
}

#[test]
fn test_gif_image_keeps_gif_extension() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    let thumbnail = manager.generate_thumbnail(Path::new("/media/loop.gif")).unwrap();
    assert_eq!(thumbnail.extension().unwrap(), "gif");

    let web = manager.generate_media_for_web(Path::new("/media/still.PNG")).unwrap();
    assert_eq!(web.extension().unwrap(), "jpg");
}

#[test]
fn test_upload_reference_builds_full_chain() {
    let temp = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    let task_dir = repo.path().join("show").join("sh010").join("comp");
    fs::create_dir_all(&task_dir).unwrap();
    let mut task = Task::new("comp", &task_dir);
    let linker = ArtifactLinker::new(
        Repository::new(repo.path()),
        manager.config().settings.storage.clone(),
    );

    let link = linker
        .upload_reference(
            &manager,
            &mut task,
            &mut Cursor::new(b"video".to_vec()),
            Some("my shot.mov"),
        )
        .unwrap();

    let base = "show/sh010/comp/References/Pipeline";
    assert_eq!(link.full_path, format!("{base}/my_shot.mov"));
    assert_eq!(link.original_filename, "my shot.mov");
    assert_eq!(link.chain_depth(), 2);

    let web = link.thumbnail().unwrap();
    assert_eq!(web.full_path, format!("{base}/ForWeb/my_shot.webm"));
    let thumbnail = web.thumbnail().unwrap();
    assert_eq!(thumbnail.full_path, format!("{base}/Thumbnail/my_shot.jpg"));

    assert!(repo.path().join(&thumbnail.full_path).exists());
    assert!(repo.path().join(&web.full_path).exists());
    assert_eq!(task.references, vec![link]);
    assert!(files_in(temp.path()).is_empty());
}

#[test]
fn test_upload_version_output_for_non_media() {
    let temp = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let runner = Arc::new(FakeRunner::new(VIDEO_STREAM));
    let manager = manager(temp.path(), &runner);

    let mut version = Version::new(repo.path().join("v001"));
    let linker = ArtifactLinker::new(
        Repository::new(repo.path()),
        manager.config().settings.storage.clone(),
    );

    let link = linker
        .upload_version_output(
            &manager,
            &mut version,
            &mut Cursor::new(b"notes".to_vec()),
            Some("notes.txt"),
        )
        .unwrap();

    assert_eq!(link.full_path, "v001/Outputs/Pipeline/notes.txt");
    assert!(link.thumbnail().is_none());
    assert_eq!(version.outputs.len(), 1);
    assert!(runner.invocations().is_empty());
}

#[test]
fn test_upload_keeps_original_when_thumbnail_fails() {
    let temp = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    // 探測成功但三幀都擷取失敗，只有網頁版本
    let runner = Arc::new(
        FakeRunner::new(VIDEO_STREAM).skipping(|inv| {
            select_filter(inv).is_some() || inv.args.get("filter_complex").is_some()
        }),
    );
    let manager = manager(temp.path(), &runner);

    let mut task = Task::new("plates", repo.path());
    let linker = ArtifactLinker::new(
        Repository::new(repo.path()),
        manager.config().settings.storage.clone(),
    );

    let link = linker
        .upload_reference(&manager, &mut task, &mut Cursor::new(b"v".to_vec()), Some("plate.mp4"))
        .unwrap();

    assert_eq!(link.chain_depth(), 1);
    assert_eq!(
        link.thumbnail().unwrap().full_path,
        "References/Pipeline/ForWeb/plate.webm"
    );
    assert_eq!(task.references.len(), 1);
}
