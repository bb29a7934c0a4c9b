//! Delivery of segments and archives to disk

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::model::Segment;
use crate::error::{SplitError, SplitResult};
use crate::output::OverwritePolicy;

/// What happened to one delivered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// Left alone because it existed and the policy is `never`
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Skipped(path) => path,
        }
    }
}

/// Output file writer
pub struct OutputWriter {
    directory: PathBuf,
    overwrite: OverwritePolicy,
}

impl OutputWriter {
    pub fn new(directory: impl Into<PathBuf>, overwrite: OverwritePolicy) -> Self {
        Self {
            directory: directory.into(),
            overwrite,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write every segment under its delivery name
    pub fn write_segments(&self, segments: &[Segment]) -> SplitResult<Vec<WriteOutcome>> {
        segments
            .iter()
            .map(|segment| self.write_file(&segment.name, segment.data()))
            .collect()
    }

    /// Write one file atomically, honoring the overwrite policy
    pub fn write_file(&self, name: &str, data: &[u8]) -> SplitResult<WriteOutcome> {
        self.ensure_output_directory()?;
        let path = self.directory.join(name);

        if path.exists() && self.overwrite == OverwritePolicy::Never {
            warn!(path = %path.display(), "Output exists, not overwriting");
            return Ok(WriteOutcome::Skipped(path));
        }

        self.write_atomic(&path, data)?;
        info!(path = %path.display(), bytes = data.len(), "Output written");
        Ok(WriteOutcome::Written(path))
    }

    /// Write through a temporary sibling and rename it into place
    fn write_atomic(&self, path: &Path, data: &[u8]) -> SplitResult<()> {
        let mut temp = tempfile::Builder::new()
            .prefix(".splitx-")
            .suffix(".part")
            .tempfile_in(&self.directory)?;
        temp.write_all(data)?;
        temp.flush()?;

        match self.overwrite {
            OverwritePolicy::Always => temp.persist(path).map(|_| ()),
            OverwritePolicy::Never => temp.persist_noclobber(path).map(|_| ()),
        }
        .map_err(|e| SplitError::Io(e.error))
    }

    fn ensure_output_directory(&self) -> SplitResult<()> {
        if !self.directory.is_dir() {
            std::fs::create_dir_all(&self.directory)?;
            info!(directory = %self.directory.display(), "Created output directory");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("out");
        let writer = OutputWriter::new(&target, OverwritePolicy::Always);

        let outcome = writer.write_file("clip_part_001.mp4", b"abc").unwrap();
        assert_eq!(outcome, WriteOutcome::Written(target.join("clip_part_001.mp4")));
        assert_eq!(std::fs::read(outcome.path()).unwrap(), b"abc");
    }

    #[test]
    fn test_overwrite_always_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path(), OverwritePolicy::Always);
        writer.write_file("a.mp4", b"old").unwrap();
        writer.write_file("a.mp4", b"new").unwrap();
        assert_eq!(std::fs::read(temp_dir.path().join("a.mp4")).unwrap(), b"new");
    }

    #[test]
    fn test_overwrite_never_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.mp4");
        std::fs::write(&path, b"old").unwrap();

        let writer = OutputWriter::new(temp_dir.path(), OverwritePolicy::Never);
        let outcome = writer.write_file("a.mp4", b"new").unwrap();
        assert_eq!(outcome, WriteOutcome::Skipped(path.clone()));
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path(), OverwritePolicy::Always);
        writer.write_file("a.mp4", b"data").unwrap();
        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4"]);
    }
}
