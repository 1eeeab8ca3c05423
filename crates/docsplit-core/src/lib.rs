//! Upload preparation for PDF documents
//!
//! Two operations, both pure transformations over in-memory bytes:
//! - [`split_if_needed`]: cut a document that exceeds the page budget
//!   (20 pages / 8 MiB) into contiguous, self-contained parts
//! - [`compress`]: rewrite a document's container encoding and optionally
//!   blank its descriptive metadata
//!
//! [`prepare_for_upload`] chains the two the way an upload workflow does.

pub mod budget;
pub mod command;
pub mod compress;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod range;
pub mod split;

#[cfg(test)]
#[allow(dead_code)]
mod fixtures;

pub use budget::{Budget, MAX_PAGES_PER_PART, MAX_SIZE_FOR_SINGLE_UPLOAD};
pub use command::{execute, DocCommand, ProcessMetrics, ProcessResult};
pub use compress::{compress, compress_with_progress, CompressOptions, CompressionResult, Tick};
pub use document::{inspect, page_count, read_from, DocumentInfo, ParseOptions};
pub use error::{DocError, Stage};
pub use pipeline::{prepare_for_upload, PrepareOptions, PreparedPart};
pub use range::PageRange;
pub use split::{part_name, split_if_needed, split_with_budget, Part, SplitResult};
