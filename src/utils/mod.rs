//! Common utilities and helpers

pub mod logging;

/// Display formatting helpers
pub struct Utils;

impl Utils {
    /// Format a byte count with two decimals (`512.00 B`, `1.50 MB`)
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.2} {}", size, UNITS[unit_index])
    }

    /// Format whole seconds as `m:ss`, or `h:mm:ss` from one hour up
    pub fn format_clock_duration(seconds: f64) -> String {
        if !seconds.is_finite() || seconds <= 0.0 {
            return "0:00".to_string();
        }
        let total_seconds = seconds.floor() as u64;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }

    /// Rounded completion percentage; 0 when nothing is planned
    pub fn calculate_progress(current: usize, total: usize) -> u32 {
        if total == 0 {
            0
        } else {
            ((current as f64 / total as f64) * 100.0).round() as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(Utils::format_file_size(0), "0.00 B");
        assert_eq!(Utils::format_file_size(512), "512.00 B");
        assert_eq!(Utils::format_file_size(1536), "1.50 KB");
        assert_eq!(Utils::format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(Utils::format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072.00 GB");
    }

    #[test]
    fn test_format_clock_duration() {
        assert_eq!(Utils::format_clock_duration(0.0), "0:00");
        assert_eq!(Utils::format_clock_duration(90.5), "1:30");
        assert_eq!(Utils::format_clock_duration(3599.9), "59:59");
        assert_eq!(Utils::format_clock_duration(3725.0), "1:02:05");
    }

    #[test]
    fn test_calculate_progress() {
        assert_eq!(Utils::calculate_progress(0, 0), 0);
        assert_eq!(Utils::calculate_progress(1, 3), 33);
        assert_eq!(Utils::calculate_progress(2, 3), 67);
        assert_eq!(Utils::calculate_progress(3, 3), 100);
    }
}
