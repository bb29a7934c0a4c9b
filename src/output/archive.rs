//! Archive packaging of finished segments

use std::io::{Cursor, Write};

use chrono::{Datelike, Local, Timelike};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::domain::model::Segment;
use crate::error::SplitResult;

/// Entries at or above this size need zip64 headers
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Pack `segments` into one zip archive, in the order given
///
/// Entries are stored uncompressed; video payloads do not shrink further.
/// Every entry is stamped with the current local time.
pub fn pack(segments: &[Segment]) -> SplitResult<Vec<u8>> {
    let modified = archive_timestamp();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for segment in segments {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(modified)
            .large_file(segment.size() >= ZIP64_THRESHOLD);
        writer.start_file(segment.name.as_str(), options)?;
        writer.write_all(segment.data())?;
        debug!(name = %segment.name, bytes = segment.size(), "Archived segment");
    }

    let bytes = writer.finish()?.into_inner();
    info!(entries = segments.len(), bytes = bytes.len(), "Archive packed");
    Ok(bytes)
}

fn archive_timestamp() -> DateTime {
    let now = Local::now();
    DateTime::from_date_and_time(
        u16::try_from(now.year()).unwrap_or(1980),
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
    .unwrap_or_default()
}
