// Domain rules - Naming and input policies

/// Extension used when a file name has none
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// Shortest segment length accepted from configuration, in seconds
pub const MIN_SEGMENT_DURATION: u32 = 5;

/// Longest segment length accepted from configuration, in seconds
pub const MAX_SEGMENT_DURATION: u32 = 300;

/// Default segment length, in seconds
pub const DEFAULT_SEGMENT_DURATION: u32 = 60;

/// Byte offset of the final `.suffix` in a file name, if it has one
///
/// The suffix must be non-empty and free of path separators and dots.
fn extension_start(file_name: &str) -> Option<usize> {
    let dot = file_name.rfind('.')?;
    let suffix = &file_name[dot + 1..];
    if suffix.is_empty() || suffix.contains('/') {
        return None;
    }
    Some(dot)
}

/// Lowercased extension including the dot, `.mp4` when there is none
pub fn extension_of(file_name: &str) -> String {
    match extension_start(file_name) {
        Some(dot) => file_name[dot..].to_lowercase(),
        None => DEFAULT_EXTENSION.to_string(),
    }
}

/// File name with its final extension removed
pub fn base_name_of(file_name: &str) -> &str {
    match extension_start(file_name) {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

/// Container mime type for an extension, `video/mp4` for unknown ones
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        ".mp4" => "video/mp4",
        ".webm" => "video/webm",
        ".mkv" => "video/x-matroska",
        ".avi" => "video/x-msvideo",
        ".mov" => "video/quicktime",
        ".m4v" => "video/x-m4v",
        ".flv" => "video/x-flv",
        ".wmv" => "video/x-ms-wmv",
        ".ts" | ".mts" => "video/mp2t",
        _ => "video/mp4",
    }
}

/// Resident name of the source during a split
pub fn engine_input_name(extension: &str) -> String {
    format!("input{}", extension)
}

/// Resident name of the source during a stand-alone inspection
pub fn engine_probe_name(extension: &str) -> String {
    format!("input_probe{}", extension)
}

/// Engine-side output name for a segment
pub fn engine_output_name(index: usize, extension: &str) -> String {
    format!("part_{:03}{}", index, extension)
}

/// Delivery name for a segment: `<base>_part_<NNN><ext>`
pub fn segment_file_name(base_name: &str, index: usize, extension: &str) -> String {
    format!("{}_{}", base_name, engine_output_name(index, extension))
}

/// Clamp a requested segment length into the supported range
pub fn clamp_segment_duration(seconds: u32) -> u32 {
    seconds.clamp(MIN_SEGMENT_DURATION, MAX_SEGMENT_DURATION)
}
