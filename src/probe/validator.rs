//! Media metadata validation

use crate::domain::model::VideoMetadata;
use crate::error::{SplitError, SplitResult};

/// Checks whether probed metadata can drive a split
pub struct MetadataValidator;

impl MetadataValidator {
    /// Reject metadata without a positive duration
    pub fn validate(metadata: &VideoMetadata) -> SplitResult<()> {
        if !metadata.is_usable() {
            return Err(SplitError::ProbeUnusable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_is_unusable() {
        let metadata = VideoMetadata::default();
        assert!(matches!(
            MetadataValidator::validate(&metadata),
            Err(SplitError::ProbeUnusable)
        ));
    }

    #[test]
    fn test_positive_duration_passes() {
        let metadata = VideoMetadata {
            duration: 1.5,
            ..Default::default()
        };
        assert!(MetadataValidator::validate(&metadata).is_ok());
    }
}
