//! Parsing of the engine's diagnostic log text

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::VideoMetadata;

// Duration: 00:01:30.50, start: 0.000000, bitrate: 1234 kb/s
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration:\s*(\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("duration regex is valid")
});

// Stream #0:0: Video: h264 (High), yuv420p, 1920x1080
static VIDEO_STREAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Video:\s*(\w+).*?,.*?(\d{2,5}x\d{2,5})").expect("video stream regex is valid")
});

/// Duration in seconds from a `Duration: HH:MM:SS.CC` line
pub fn parse_duration(line: &str) -> Option<f64> {
    let caps = DURATION.captures(line)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let seconds: u32 = caps[3].parse().ok()?;
    let centis: u32 = caps[4].parse().ok()?;
    Some(
        f64::from(hours) * 3600.0
            + f64::from(minutes) * 60.0
            + f64::from(seconds)
            + f64::from(centis) / 100.0,
    )
}

/// Codec and `WxH` resolution from a video stream line
pub fn parse_video_stream(line: &str) -> Option<(String, String)> {
    let caps = VIDEO_STREAM.captures(line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Metadata from a complete probe log; the first match of each kind wins
///
/// Missing lines leave the corresponding fields at their zero values.
pub fn parse_probe_log<S: AsRef<str>>(lines: &[S]) -> VideoMetadata {
    let mut metadata = VideoMetadata::default();
    let mut have_duration = false;
    let mut have_stream = false;

    for line in lines {
        let line = line.as_ref();
        if !have_duration {
            if let Some(duration) = parse_duration(line) {
                metadata.duration = duration;
                have_duration = true;
            }
        }
        if !have_stream {
            if let Some((codec, resolution)) = parse_video_stream(line) {
                metadata.codec = codec;
                metadata.resolution = resolution;
                have_stream = true;
            }
        }
        if have_duration && have_stream {
            break;
        }
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE_LOG: &[&str] = &[
        "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'input.mp4':",
        "  Duration: 00:01:30.50, start: 0.000000, bitrate: 4123 kb/s",
        "  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(tv, bt709, progressive), 1920x1080 [SAR 1:1 DAR 16:9], 3990 kb/s, 29.97 fps",
        "  Stream #0:1[0x2](und): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s",
        "Output #0, null, to 'pipe:':",
    ];

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("  Duration: 00:01:30.50, start: 0.0"), Some(90.5));
        assert_eq!(parse_duration("Duration: 01:00:00.00"), Some(3600.0));
        assert_eq!(parse_duration("Duration: N/A, bitrate: N/A"), None);
    }

    #[test]
    fn test_parse_video_stream() {
        let (codec, resolution) =
            parse_video_stream("Video: h264 (High), yuv420p, 1920x1080").unwrap();
        assert_eq!(codec, "h264");
        assert_eq!(resolution, "1920x1080");
        assert!(parse_video_stream("Audio: aac (LC), 48000 Hz, stereo").is_none());
    }

    #[test]
    fn test_parse_real_probe_log() {
        let metadata = parse_probe_log(PROBE_LOG);
        assert_eq!(metadata.duration, 90.5);
        assert_eq!(metadata.codec, "h264");
        assert_eq!(metadata.resolution, "1920x1080");
    }

    #[test]
    fn test_first_duration_wins() {
        let lines = ["Duration: 00:00:10.00", "Duration: 00:00:20.00"];
        assert_eq!(parse_probe_log(&lines[..]).duration, 10.0);
    }

    #[test]
    fn test_missing_lines_yield_zero_values() {
        let lines = ["Input #0, matroska,webm, from 'input.mkv':", "Press [q] to stop"];
        let metadata = parse_probe_log(&lines[..]);
        assert_eq!(metadata.duration, 0.0);
        assert!(metadata.codec.is_empty());
        assert!(metadata.resolution.is_empty());
        assert!(!metadata.is_usable());
    }
}
