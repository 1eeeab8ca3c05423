//! Upload preparation: split when over budget, then compress every part.
//!
//! A part whose compressed form is not smaller keeps its uncompressed bytes.
//! Any failure aborts the whole preparation; no partial output is returned.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::budget::Budget;
use crate::compress::{compress, CompressOptions};
use crate::document::ParseOptions;
use crate::error::DocError;
use crate::range::PageRange;
use crate::split::split_with_budget;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    pub budget: Budget,
    pub compress: CompressOptions,
    /// Applies to both the split and the compression of every part
    pub parse: ParseOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedPart {
    pub name: String,
    pub range: PageRange,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Size of the part before compression
    pub original_size: usize,
    /// Whether `bytes` holds the compressed rewrite
    pub compressed: bool,
}

pub fn prepare_for_upload(
    bytes: &[u8],
    original_name: &str,
    options: &PrepareOptions,
) -> Result<Vec<PreparedPart>, DocError> {
    let split = split_with_budget(bytes, original_name, &options.budget, &options.parse)?;
    let total = split.parts.len();
    let compress_options = CompressOptions {
        parse: options.parse,
        ..options.compress
    };

    let mut prepared = Vec::with_capacity(total);
    for (index, part) in split.parts.into_iter().enumerate() {
        let result =
            compress(&part.bytes, &compress_options).map_err(|e| part_error(index, total, e))?;

        let original_size = part.bytes.len();
        let (bytes, compressed) = if result.compressed_size < original_size {
            (result.bytes, true)
        } else {
            debug!(
                part = %part.name,
                original_size,
                compressed_size = result.compressed_size,
                "keeping uncompressed part"
            );
            (part.bytes, false)
        };

        prepared.push(PreparedPart {
            name: part.name,
            range: part.range,
            bytes,
            original_size,
            compressed,
        });
    }

    info!(
        name = original_name,
        parts = prepared.len(),
        was_split = split.was_split,
        "document prepared for upload"
    );
    Ok(prepared)
}

fn part_error(index: usize, total: usize, error: DocError) -> DocError {
    DocError::PartConstruction {
        index,
        total,
        reason: format!("{} stage: {}", error.stage(), error),
    }
}
