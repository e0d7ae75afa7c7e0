//! 外部媒體工具（ffmpeg / ffprobe）呼叫器
//!
//! 參數以有序的 `(flag, value)` 清單表示，統一轉成命令列；
//! 執行時逐行收集單一輸出串流，結束碼交由呼叫端判斷。

use crate::error::{MediaError, MediaResult};
use log::{debug, warn};
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use sysinfo::System;

/// 輸出為靜態圖片時不指定 `-threads`
const STILL_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "tga"];

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 單一參數值；`Multi` 會讓 flag 依序重複出現
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Single(String),
    Multi(Vec<String>),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&Path> for ArgValue {
    fn from(value: &Path) -> Self {
        Self::Single(value.to_string_lossy().to_string())
    }
}

impl From<&PathBuf> for ArgValue {
    fn from(value: &PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<u64> for ArgValue {
    fn from(value: u64) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<&[PathBuf]> for ArgValue {
    fn from(values: &[PathBuf]) -> Self {
        Self::Multi(
            values
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
        )
    }
}

/// 有序的工具參數表
///
/// `set` 對已存在的 key 會原地覆寫（保留位置），否則附加在最後。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    entries: Vec<(String, ArgValue)>,
}

impl ToolArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ArgValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 以 `overrides` 覆寫或補充目前的參數
    pub fn merge(&mut self, overrides: &Self) {
        for (key, value) in &overrides.entries {
            self.set(key, value.clone());
        }
    }

    pub fn extend(&mut self, other: Self) {
        for (key, value) in other.entries {
            self.set(&key, value);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 轉成 `-key value` 形式的參數序列
    #[must_use]
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            let flag = format!("-{key}");
            match value {
                ArgValue::Single(v) => {
                    flags.push(flag);
                    flags.push(v.clone());
                }
                ArgValue::Multi(values) => {
                    for v in values {
                        flags.push(flag.clone());
                        flags.push(v.clone());
                    }
                }
            }
        }
        flags
    }
}

/// 要收集的輸出串流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvocationKind {
    Transcode,
    Probe,
}

/// 一次外部工具呼叫
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub executable: PathBuf,
    pub args: ToolArgs,
    pub output: Option<PathBuf>,
    kind: InvocationKind,
}

impl ToolInvocation {
    /// 轉檔呼叫：收集 stderr，強制覆寫輸出
    #[must_use]
    pub fn transcoder(executable: &Path, args: ToolArgs, output: Option<&Path>) -> Self {
        Self {
            executable: executable.to_path_buf(),
            args,
            output: output.map(Path::to_path_buf),
            kind: InvocationKind::Transcode,
        }
    }

    /// 探測呼叫：收集 stdout
    #[must_use]
    pub fn prober(executable: &Path, args: ToolArgs) -> Self {
        Self {
            executable: executable.to_path_buf(),
            args,
            output: None,
            kind: InvocationKind::Probe,
        }
    }

    #[must_use]
    pub const fn capture(&self) -> CaptureStream {
        match self.kind {
            InvocationKind::Transcode => CaptureStream::Stderr,
            InvocationKind::Probe => CaptureStream::Stdout,
        }
    }

    #[must_use]
    pub fn tool_name(&self) -> String {
        self.executable
            .file_stem()
            .map_or_else(|| "tool".to_string(), |s| s.to_string_lossy().to_string())
    }

    /// 完整的命令列（第一個元素為執行檔）
    #[must_use]
    pub fn command_line(&self, threads: usize) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![self.executable.clone().into_os_string()];
        argv.extend(self.args.to_flags().into_iter().map(OsString::from));

        if self.kind == InvocationKind::Transcode {
            if let Some(output) = self.output.as_deref().filter(|o| !is_still_image(o)) {
                debug!("輸出非靜態圖片，使用 {threads} 執行緒: {}", output.display());
                argv.push("-threads".into());
                argv.push(threads.to_string().into());
            }
            argv.push("-y".into());
            if let Some(output) = &self.output {
                argv.push(output.clone().into_os_string());
            }
        }

        argv
    }
}

/// 判斷輸出路徑是否為靜態圖片格式
#[must_use]
pub fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            STILL_IMAGE_EXTENSIONS
                .iter()
                .any(|still| still.eq_ignore_ascii_case(ext))
        })
}

/// 工具執行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub succeeded: bool,
    pub exit_code: Option<i32>,
    pub lines: Vec<String>,
}

impl ToolOutput {
    /// 非零結束碼轉成 `ToolInvocationFailure`
    pub fn into_result(self, tool: &str) -> MediaResult<Self> {
        if self.succeeded {
            Ok(self)
        } else {
            Err(MediaError::ToolInvocationFailure {
                tool: tool.to_string(),
                exit_code: self.exit_code,
                output: self.lines,
            })
        }
    }
}

/// 執行外部工具的介面，元件透過它呼叫 ffmpeg / ffprobe
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> MediaResult<ToolOutput>;
}

/// 以子程序執行外部工具
pub struct ProcessRunner {
    threads: usize,
    timeout: Option<Duration>,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ProcessRunner {
    /// `threads` 未指定時使用主機的邏輯核心數
    #[must_use]
    pub fn new(threads: Option<usize>) -> Self {
        Self {
            threads: threads.filter(|&t| t > 0).unwrap_or_else(host_core_count),
            timeout: None,
            shutdown_signal: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| signal.load(Ordering::SeqCst))
    }

    fn terminate(child: &mut Child, tool: &str) {
        if let Err(e) = child.kill() {
            warn!("無法終止 {tool} 程序: {e}");
        }
        let _ = child.wait();
    }

    /// 終止子程序並等待輸出收集執行緒結束
    fn abort(child: &mut Child, collector: Option<JoinHandle<Vec<String>>>, tool: &str) {
        Self::terminate(child, tool);
        if let Some(handle) = collector {
            let _ = handle.join();
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> MediaResult<ToolOutput> {
        let tool = invocation.tool_name();
        let argv = invocation.command_line(self.threads);
        debug!("呼叫 {tool}，參數: {argv:?}");

        let mut command = Command::new(&argv[0]);
        command.args(&argv[1..]).stdin(Stdio::null());
        match invocation.capture() {
            CaptureStream::Stdout => command.stdout(Stdio::piped()).stderr(Stdio::null()),
            CaptureStream::Stderr => command.stdout(Stdio::null()).stderr(Stdio::piped()),
        };

        let mut child = command.spawn().map_err(|source| MediaError::ToolSpawn {
            tool: tool.clone(),
            source,
        })?;

        let stream: Option<Box<dyn Read + Send>> = match invocation.capture() {
            CaptureStream::Stdout => child
                .stdout
                .take()
                .map(|s| Box::new(s) as Box<dyn Read + Send>),
            CaptureStream::Stderr => child
                .stderr
                .take()
                .map(|s| Box::new(s) as Box<dyn Read + Send>),
        };
        let collector = stream.map(|stream| {
            let tool = tool.clone();
            thread::spawn(move || collect_lines(stream, &tool))
        });

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    Self::abort(&mut child, collector, &tool);
                    return Err(MediaError::Io(e));
                }
            }

            if self.is_cancelled() {
                warn!("收到中斷訊號，終止 {tool}");
                Self::abort(&mut child, collector, &tool);
                return Err(MediaError::Cancelled { tool });
            }

            if let Some(timeout) = self.timeout.filter(|t| started.elapsed() >= *t) {
                warn!("{tool} 執行超過 {timeout:?}，終止程序");
                Self::abort(&mut child, collector, &tool);
                return Err(MediaError::ToolTimeout { tool, timeout });
            }

            thread::sleep(POLL_INTERVAL);
        };

        let lines = collector
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default();

        if !status.success() {
            warn!("{tool} 結束碼非零: {:?}", status.code());
        }
        debug!("{tool} 執行完成");

        Ok(ToolOutput {
            succeeded: status.success(),
            exit_code: status.code(),
            lines,
        })
    }
}

/// 逐行讀取輸出直到串流結束；非 UTF-8 內容以替代字元保留
fn collect_lines(stream: impl Read, tool: &str) -> Vec<String> {
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();
    let mut lines = Vec::new();

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                debug!("[{tool}] {line}");
                lines.push(line);
            }
        }
    }

    lines
}

/// 主機邏輯核心數，至少為 1
fn host_core_count() -> usize {
    let mut system = System::new();
    system.refresh_cpu_all();
    system.cpus().len().max(1)
}
