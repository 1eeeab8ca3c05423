use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("Failed to read document bytes: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF ({size} bytes): {reason}")]
    Parse { size: usize, reason: String },

    #[error("Failed to build part {} of {total}: {reason}", .index + 1)]
    PartConstruction {
        /// Zero-based index of the part that failed
        index: usize,
        total: usize,
        reason: String,
    },

    #[error("Document rejected: {0}")]
    Validation(String),

    #[error("Failed to serialize document: {0}")]
    Serialization(String),
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Parse,
    Part,
    Validate,
    Serialize,
}

impl DocError {
    pub fn stage(&self) -> Stage {
        match self {
            DocError::Read { .. } => Stage::Read,
            DocError::Parse { .. } => Stage::Parse,
            DocError::PartConstruction { .. } => Stage::Part,
            DocError::Validation(_) => Stage::Validate,
            DocError::Serialization(_) => Stage::Serialize,
        }
    }

    pub(crate) fn parse(size: usize, reason: impl fmt::Display) -> Self {
        DocError::Parse {
            size,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::Parse => "parse",
            Stage::Part => "part",
            Stage::Validate => "validate",
            Stage::Serialize => "serialize",
        };
        f.write_str(name)
    }
}
