//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` executable as the transcoding engine. Each loaded
//! engine owns a private scratch directory that serves as its file
//! workspace; commands run with that directory as their working directory,
//! so argv paths are plain workspace names.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{SplitError, SplitResult};
use crate::ports::{EngineEvent, EngineEventSink, EngineExit, TranscodeEngine};

static PROGRESS_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("progress regex is valid")
});

struct LoadedEngine {
    binary: PathBuf,
    workspace: TempDir,
    events: EngineEventSink,
}

/// FFmpeg-based transcoding engine
pub struct FfmpegEngine {
    configured_binary: Option<PathBuf>,
    state: Mutex<Option<LoadedEngine>>,
}

impl FfmpegEngine {
    /// Create a new engine; `binary` overrides the `PATH` lookup
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            configured_binary: binary,
            state: Mutex::new(None),
        }
    }

    fn resolve_binary(&self) -> SplitResult<PathBuf> {
        match &self.configured_binary {
            Some(path) => Ok(path.clone()),
            None => which::which("ffmpeg").map_err(|e| SplitError::EngineLoad {
                message: format!("ffmpeg not found on PATH: {}", e),
            }),
        }
    }

    /// Binary, workspace directory and event sink of the loaded engine
    fn loaded(&self) -> SplitResult<(PathBuf, PathBuf, EngineEventSink)> {
        let state = self.state.lock().map_err(|_| SplitError::Engine {
            message: "engine state lock poisoned".to_string(),
        })?;
        let engine = state.as_ref().ok_or(SplitError::EngineNotLoaded)?;
        Ok((
            engine.binary.clone(),
            engine.workspace.path().to_path_buf(),
            engine.events.clone(),
        ))
    }

    fn workspace_path(&self, name: &str) -> SplitResult<PathBuf> {
        if name.is_empty() || name == ".." || name.contains('/') || name.contains('\\') {
            return Err(SplitError::Engine {
                message: format!("invalid workspace file name: {:?}", name),
            });
        }
        let (_, workspace, _) = self.loaded()?;
        Ok(workspace.join(name))
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn load(&self, events: EngineEventSink) -> SplitResult<()> {
        let binary = self.resolve_binary()?;
        let output = Command::new(&binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SplitError::EngineLoad {
                message: format!("failed to start {}: {}", binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(SplitError::EngineLoad {
                message: format!("{} -version exited with {}", binary.display(), output.status),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();

        let workspace = tempfile::Builder::new()
            .prefix("splitx-")
            .tempdir()
            .map_err(|e| SplitError::EngineLoad {
                message: format!("failed to create engine workspace: {}", e),
            })?;

        info!(binary = %binary.display(), workspace = %workspace.path().display(), "{}", version);

        let mut state = self.state.lock().map_err(|_| SplitError::EngineLoad {
            message: "engine state lock poisoned".to_string(),
        })?;
        *state = Some(LoadedEngine {
            binary,
            workspace,
            events,
        });
        Ok(())
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> SplitResult<()> {
        let path = self.workspace_path(name)?;
        tokio::fs::write(&path, data).await?;
        debug!(name, bytes = data.len(), "Wrote workspace file");
        Ok(())
    }

    async fn read_file(&self, name: &str) -> SplitResult<Vec<u8>> {
        let path = self.workspace_path(name)?;
        tokio::fs::read(&path).await.map_err(|e| not_found_as(name, e))
    }

    async fn delete_file(&self, name: &str) -> SplitResult<()> {
        let path = self.workspace_path(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_as(name, e))
    }

    async fn exec(&self, argv: &[String]) -> SplitResult<EngineExit> {
        let (binary, workspace, events) = self.loaded()?;
        debug!(?argv, "Running ffmpeg");

        let mut child = Command::new(&binary)
            .arg("-hide_banner")
            .arg("-nostdin")
            .args(argv)
            .current_dir(&workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SplitError::Engine {
                message: format!("failed to start {}: {}", binary.display(), e),
            })?;

        if let Some(stderr) = child.stderr.take() {
            pump_diagnostics(stderr, &events).await?;
        }

        let status = child.wait().await?;
        Ok(EngineExit {
            code: status.code(),
        })
    }

    async fn terminate(&self) {
        let previous = self.state.lock().ok().and_then(|mut state| state.take());
        if let Some(engine) = previous {
            debug!(workspace = %engine.workspace.path().display(), "Releasing engine workspace");
        }
    }
}

fn not_found_as(name: &str, error: std::io::Error) -> SplitError {
    if error.kind() == ErrorKind::NotFound {
        SplitError::FileNotFound {
            name: name.to_string(),
        }
    } else {
        SplitError::Io(error)
    }
}

/// Forward every diagnostic line to the event sink
///
/// ffmpeg rewrites its status line with `\r`, so both `\r` and `\n` end a
/// line here.
async fn pump_diagnostics<R>(stream: R, events: &EngineEventSink) -> SplitResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut stream = stream;
    let mut line = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                emit_line(&mut line, events);
            } else {
                line.push(byte);
            }
        }
    }
    emit_line(&mut line, events);
    Ok(())
}

fn emit_line(line: &mut Vec<u8>, events: &EngineEventSink) {
    if line.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(line).trim_end().to_string();
    line.clear();
    if text.is_empty() {
        return;
    }
    let progress = parse_progress_time(&text);
    events(EngineEvent::Log(text));
    if let Some(time) = progress {
        events(EngineEvent::Progress { time });
    }
}

/// Media time from an ffmpeg status line (`time=00:01:02.50`)
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = PROGRESS_TIME.captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
