//! Shared fixtures: a scripted in-memory engine and recording observers

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use splitx_cli::app::CancelFlag;
use splitx_cli::engine::progress::{EngineObserver, ProgressObserver, SplitEvent};
use splitx_cli::ports::{EngineEvent, EngineEventSink, EngineExit, TranscodeEngine};
use splitx_cli::{SplitError, SplitResult};

/// Diagnostic text ffmpeg prints for a probed 1080p h264 file
pub fn probe_log(duration: &str) -> Vec<String> {
    vec![
        "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'input.mp4':".to_string(),
        "  Metadata:".to_string(),
        "    major_brand     : isom".to_string(),
        format!("  Duration: {}, start: 0.000000, bitrate: 2140 kb/s", duration),
        "  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 2000 kb/s, 30 fps".to_string(),
        "  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s".to_string(),
        "Output #0, null, to 'pipe:':".to_string(),
    ]
}

/// Behaviour of the fake engine
#[derive(Clone, Default)]
pub struct Script {
    /// Lines the probe command prints
    pub probe_log: Vec<String>,
    /// 1-based extraction that reports failure
    pub fail_extraction: Option<usize>,
    /// The failing extraction leaves a partial output behind
    pub partial_output_on_failure: bool,
    pub fail_load: bool,
    /// 1-based extraction that reports success but writes nothing
    pub lose_output: Option<usize>,
    /// The first probe command cannot be run at all
    pub probe_error_once: bool,
    /// Yield to the scheduler inside every command
    pub yield_during_exec: bool,
    /// Cancel this flag once the given extraction finished
    pub cancel_after: Option<(usize, CancelFlag)>,
}

impl Script {
    pub fn with_duration(duration: &str) -> Self {
        Self {
            probe_log: probe_log(duration),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct FakeState {
    events: Option<EngineEventSink>,
    files: HashMap<String, Vec<u8>>,
    loads: usize,
    writes: usize,
    created: Vec<String>,
    deleted: Vec<String>,
    delete_calls: usize,
    commands: Vec<Vec<String>>,
    extractions: usize,
    probe_errors: usize,
}

/// Transcoding engine with an in-memory workspace and scripted commands
pub struct FakeEngine {
    script: Script,
    state: Mutex<FakeState>,
}

impl FakeEngine {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            state: Mutex::new(FakeState::default()),
        })
    }

    pub fn loads(&self) -> usize {
        self.state.lock().unwrap().loads
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// Every file that ever became resident, in order
    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    /// Every file successfully deleted, in order
    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn resident(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().unwrap().files.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().commands.clone()
    }

    /// Extraction commands only
    pub fn extractions(&self) -> Vec<Vec<String>> {
        self.commands()
            .into_iter()
            .filter(|argv| argv.iter().any(|arg| arg == "copy"))
            .collect()
    }

    fn emit(&self, lines: &[String]) {
        let sink = self.state.lock().unwrap().events.clone();
        if let Some(sink) = sink {
            for line in lines {
                sink(EngineEvent::Log(line.clone()));
            }
        }
    }

    fn create(&self, name: &str, data: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.files.insert(name.to_string(), data);
        state.created.push(name.to_string());
    }
}

fn arg_after<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.iter()
        .position(|arg| arg == flag)
        .and_then(|i| argv.get(i + 1))
        .map(String::as_str)
}

#[async_trait]
impl TranscodeEngine for FakeEngine {
    async fn load(&self, events: EngineEventSink) -> SplitResult<()> {
        if self.script.fail_load {
            return Err(SplitError::EngineLoad {
                message: "core download failed".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        state.loads += 1;
        state.events = Some(events);
        Ok(())
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> SplitResult<()> {
        self.state.lock().unwrap().writes += 1;
        self.create(name, data.to_vec());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> SplitResult<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| SplitError::FileNotFound {
                name: name.to_string(),
            })
    }

    async fn delete_file(&self, name: &str) -> SplitResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        match state.files.remove(name) {
            Some(_) => {
                state.deleted.push(name.to_string());
                Ok(())
            }
            None => Err(SplitError::FileNotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn exec(&self, argv: &[String]) -> SplitResult<EngineExit> {
        self.state.lock().unwrap().commands.push(argv.to_vec());
        if self.script.yield_during_exec {
            tokio::task::yield_now().await;
        }

        let input = arg_after(argv, "-i").unwrap_or_default().to_string();
        if !self.state.lock().unwrap().files.contains_key(&input) {
            self.emit(&[format!("{}: No such file or directory", input)]);
            return Ok(EngineExit::failure(1));
        }

        // Probe: the null muxer never gets real output
        if arg_after(argv, "-f") == Some("null") {
            if self.script.probe_error_once {
                let first = {
                    let mut state = self.state.lock().unwrap();
                    state.probe_errors += 1;
                    state.probe_errors == 1
                };
                if first {
                    self.emit(&["Error while opening decoder pipe".to_string()]);
                    return Err(SplitError::Engine {
                        message: "engine worker crashed".to_string(),
                    });
                }
            }
            self.emit(&self.script.probe_log);
            self.emit(&["At least one output file must be specified".to_string()]);
            return Ok(EngineExit::failure(1));
        }

        let output = argv.last().cloned().unwrap_or_default();
        let number = {
            let mut state = self.state.lock().unwrap();
            state.extractions += 1;
            state.extractions
        };

        if self.script.fail_extraction == Some(number) {
            if self.script.partial_output_on_failure {
                self.create(&output, b"partial".to_vec());
            }
            self.emit(&[format!("{}: Invalid data found when processing input", input)]);
            return Ok(EngineExit::failure(1));
        }

        self.emit(&[
            format!("Output #0, mp4, to '{}':", output),
            "frame=  900 fps=0.0 q=-1.0 Lsize=    4096kB time=00:00:30.00 bitrate=1118.5kbits/s speed= 300x".to_string(),
        ]);
        if self.script.yield_during_exec {
            tokio::task::yield_now().await;
        }
        if self.script.lose_output != Some(number) {
            self.create(&output, format!("segment {}", number).into_bytes());
        }

        if let Some((after, flag)) = &self.script.cancel_after {
            if *after == number {
                flag.cancel();
            }
        }
        Ok(EngineExit::success())
    }

    async fn terminate(&self) {
        let mut state = self.state.lock().unwrap();
        state.events = None;
        state.files.clear();
    }
}

/// Progress observer that keeps every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SplitEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SplitEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(SplitEvent::kind).collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_event(&self, event: &SplitEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Engine observer that keeps every log line
#[derive(Default)]
pub struct EngineLineRecorder {
    lines: Mutex<Vec<String>>,
}

impl EngineLineRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl EngineObserver for EngineLineRecorder {
    fn on_engine_event(&self, event: &EngineEvent) {
        if let EngineEvent::Log(line) = event {
            self.lines.lock().unwrap().push(line.clone());
        }
    }
}
