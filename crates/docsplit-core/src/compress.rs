//! Structural PDF compression
//!
//! Rewrites a document's container encoding (stream filters, object streams,
//! cross-reference stream) without touching page content, optionally blanking
//! descriptive metadata. Stream compression runs in batches of
//! `objects_per_tick` objects; a progress hook fires between batches so a
//! single-threaded host can yield.

use lopdf::Object;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::{self, ParseOptions, SaveMode};
use crate::error::DocError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    pub remove_metadata: bool,
    /// Write object streams and a cross-reference stream
    pub use_object_streams: bool,
    /// Flate-encode streams that carry no filter yet
    pub compress_streams: bool,
    pub objects_per_tick: usize,
    /// Set by the caller; configuration carries a single `parse` section
    #[serde(skip)]
    pub parse: ParseOptions,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            remove_metadata: true,
            use_object_streams: true,
            compress_streams: true,
            objects_per_tick: 64,
            parse: ParseOptions::default(),
        }
    }
}

/// Progress after one batch of objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionResult {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub original_size: usize,
    pub compressed_size: usize,
    /// Percentage saved; negative when the rewrite grew the document
    pub compression_ratio: f64,
}

impl CompressionResult {
    pub fn grew(&self) -> bool {
        self.compressed_size > self.original_size
    }
}

pub fn compress(bytes: &[u8], options: &CompressOptions) -> Result<CompressionResult, DocError> {
    compress_with_progress(bytes, options, |_| {})
}

pub fn compress_with_progress<F>(
    bytes: &[u8],
    options: &CompressOptions,
    mut on_tick: F,
) -> Result<CompressionResult, DocError>
where
    F: FnMut(Tick),
{
    let mut doc = document::load(bytes, &options.parse)?;

    if options.remove_metadata {
        document::clear_metadata(&mut doc);
        debug!("descriptive metadata cleared");
    }

    let batch = options.objects_per_tick.max(1);
    let total = doc.objects.len();
    let mut processed = 0;
    let mut objects = doc.objects.values_mut().peekable();
    while objects.peek().is_some() {
        for object in objects.by_ref().take(batch) {
            if let Object::Stream(ref mut stream) = *object {
                if options.compress_streams && stream.allows_compression {
                    // Streams that already carry a filter are left as they are
                    let _ = stream.compress();
                }
            }
            processed += 1;
        }
        on_tick(Tick { processed, total });
    }

    let mode = if options.use_object_streams {
        SaveMode::ObjectStreams
    } else {
        SaveMode::Classic
    };
    let output = document::serialize(&mut doc, mode)
        .map_err(|e| DocError::Serialization(e.to_string()))?;

    let result = CompressionResult {
        original_size: bytes.len(),
        compressed_size: output.len(),
        compression_ratio: ratio(bytes.len(), output.len()),
        bytes: output,
    };

    if result.grew() {
        warn!(
            original = result.original_size,
            compressed = result.compressed_size,
            "rewrite increased document size"
        );
    } else {
        info!(
            original = result.original_size,
            compressed = result.compressed_size,
            ratio = result.compression_ratio,
            "document compressed"
        );
    }

    Ok(result)
}

fn ratio(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}
