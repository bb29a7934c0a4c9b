//! Engine argv builders

/// Media length requested from the probe pass, in seconds
const PROBE_LENGTH: &str = "0.001";

/// Argv for a metadata probe: decode almost nothing into a null sink
///
/// ffmpeg prints the container and stream summary before it starts, which
/// is all the probe needs. The command may still report failure.
pub fn probe_args(input: &str) -> Vec<String> {
    ["-i", input, "-f", "null", "-t", PROBE_LENGTH, "-"]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

/// Stream-copy extraction of one time range
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractCommand {
    /// Resident input name
    pub input: String,
    /// Engine-side output name
    pub output: String,
    /// Seek offset, seconds
    pub start: f64,
    /// Duration bound, seconds
    pub length: f64,
}

impl ExtractCommand {
    pub fn to_args(&self) -> Vec<String> {
        vec![
            // Seek before opening the input
            "-ss".to_string(),
            format_seconds(self.start),
            "-i".to_string(),
            self.input.clone(),
            "-t".to_string(),
            format_seconds(self.length),
            // Copy streams verbatim
            "-c".to_string(),
            "copy".to_string(),
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-y".to_string(),
            self.output.clone(),
        ]
    }
}

/// Seconds without a trailing `.0` for whole values
fn format_seconds(seconds: f64) -> String {
    format!("{}", seconds)
}
