//! Page budget: the thresholds below which a document is uploaded whole.

use serde::{Deserialize, Serialize};

use crate::error::DocError;

pub const MAX_PAGES_PER_PART: u32 = 20;
pub const MAX_SIZE_FOR_SINGLE_UPLOAD: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Maximum pages in one uploaded part
    pub max_pages_per_part: u32,
    /// Largest document (in bytes) uploaded without splitting
    pub max_single_upload_bytes: u64,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_pages_per_part: MAX_PAGES_PER_PART,
            max_single_upload_bytes: MAX_SIZE_FOR_SINGLE_UPLOAD,
        }
    }
}

impl Budget {
    pub fn validate(&self) -> Result<(), DocError> {
        if self.max_pages_per_part == 0 {
            return Err(DocError::Validation(
                "max_pages_per_part must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Both limits are inclusive: a document exactly at the budget stays whole.
    pub fn needs_split(&self, size_bytes: u64, page_count: u32) -> bool {
        size_bytes > self.max_single_upload_bytes || page_count > self.max_pages_per_part
    }

    /// Number of parts a document of `page_count` pages is cut into
    pub fn part_count(&self, page_count: u32) -> u32 {
        page_count.div_ceil(self.max_pages_per_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_inclusive() {
        let budget = Budget::default();
        assert!(!budget.needs_split(MAX_SIZE_FOR_SINGLE_UPLOAD, MAX_PAGES_PER_PART));
        assert!(budget.needs_split(MAX_SIZE_FOR_SINGLE_UPLOAD + 1, 1));
        assert!(budget.needs_split(1024, MAX_PAGES_PER_PART + 1));
    }

    #[test]
    fn test_part_count() {
        let budget = Budget::default();
        assert_eq!(budget.part_count(45), 3);
        assert_eq!(budget.part_count(21), 2);
        assert_eq!(budget.part_count(20), 1);
        assert_eq!(budget.part_count(40), 2);
    }

    #[test]
    fn test_zero_pages_per_part_rejected() {
        let budget = Budget {
            max_pages_per_part: 0,
            ..Budget::default()
        };
        assert!(matches!(budget.validate(), Err(DocError::Validation(_))));
    }
}
