//! Bounded PDF splitting
//!
//! Cuts a document into contiguous parts of at most `max_pages_per_part`
//! pages each. Every part is built by "Construction by Whitelist":
//! 1. Clone the parsed source
//! 2. Delete every page outside the part's range
//! 3. Prune objects no longer reachable from the page tree
//! 4. Serialize
//!
//! Documents already inside the budget are returned untouched.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document, ObjectId};
use serde::Serialize;
use tracing::{debug, info};

use crate::budget::Budget;
use crate::document::{self, ParseOptions, SaveMode};
use crate::error::DocError;
use crate::range::PageRange;

const DEFAULT_EXTENSION: &str = "pdf";

/// A contiguous page range of the source document, as its own PDF
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub name: String,
    pub range: PageRange,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Part {
    /// Human-readable page range, e.g. "21-40"
    pub fn pages_label(&self) -> String {
        self.range.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitResult {
    pub parts: Vec<Part>,
    pub total_pages: u32,
    pub was_split: bool,
}

/// Split with the default budget (20 pages, 8 MiB) and permissive parsing
pub fn split_if_needed(bytes: &[u8], original_name: &str) -> Result<SplitResult, DocError> {
    split_with_budget(
        bytes,
        original_name,
        &Budget::default(),
        &ParseOptions::default(),
    )
}

pub fn split_with_budget(
    bytes: &[u8],
    original_name: &str,
    budget: &Budget,
    parse: &ParseOptions,
) -> Result<SplitResult, DocError> {
    budget.validate()?;

    let doc = document::load(bytes, parse)?;
    let source_pages = doc.get_pages();
    let total_pages = source_pages.len() as u32;

    if total_pages == 0 {
        return Err(DocError::Validation(format!(
            "{} has no pages",
            original_name
        )));
    }

    if !budget.needs_split(bytes.len() as u64, total_pages) {
        debug!(
            name = original_name,
            total_pages,
            size = bytes.len(),
            "document within budget, not splitting"
        );
        return Ok(SplitResult {
            parts: vec![Part {
                name: original_name.to_string(),
                range: PageRange {
                    start: 1,
                    end: total_pages,
                },
                bytes: bytes.to_vec(),
            }],
            total_pages,
            was_split: false,
        });
    }

    let num_parts = budget.part_count(total_pages) as usize;
    info!(
        name = original_name,
        total_pages,
        size = bytes.len(),
        num_parts,
        "splitting document"
    );

    let mut parts = Vec::with_capacity(num_parts);
    for index in 0..num_parts {
        let start = index as u32 * budget.max_pages_per_part;
        let end = (start + budget.max_pages_per_part).min(total_pages);
        let range = PageRange {
            start: start + 1,
            end,
        };

        let part_bytes = extract_range(&doc, &source_pages, range).map_err(|reason| {
            DocError::PartConstruction {
                index,
                total: num_parts,
                reason,
            }
        })?;

        info!(
            part = index + 1,
            of = num_parts,
            pages = %range,
            size = part_bytes.len(),
            "part built"
        );

        parts.push(Part {
            name: part_name(original_name, index + 1, num_parts),
            range,
            bytes: part_bytes,
        });
    }

    Ok(SplitResult {
        parts,
        total_pages,
        was_split: true,
    })
}

/// `{stem}_parte{number}de{total}.{ext}`; the extension falls back to "pdf"
pub fn part_name(original_name: &str, number: usize, total: usize) -> String {
    let path = Path::new(original_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{}_parte{}de{}.{}", stem, number, total, ext)
}

fn extract_range(
    source: &Document,
    source_pages: &BTreeMap<u32, ObjectId>,
    range: PageRange,
) -> Result<Vec<u8>, String> {
    let mut part = source.clone();

    let to_delete: Vec<u32> = source_pages
        .keys()
        .copied()
        .filter(|page| *page < range.start || *page > range.end)
        .collect();
    part.delete_pages(&to_delete);
    part.prune_objects();

    // Object ids survive the clone, so the part must hold exactly the range's page objects
    let expected: Vec<ObjectId> = source_pages
        .range(range.start..=range.end)
        .map(|(_, id)| *id)
        .collect();
    let kept: Vec<ObjectId> = part.get_pages().into_values().collect();
    if kept != expected {
        return Err(format!(
            "expected {} pages for range {}, page tree holds {}",
            range.len(),
            range,
            kept.len()
        ));
    }
    if let Some(missing) = kept.iter().find(|id| part.get_dictionary(**id).is_err()) {
        return Err(format!(
            "page object {} {} R missing from range {}",
            missing.0, missing.1, range
        ));
    }

    document::serialize(&mut part, SaveMode::Classic).map_err(|e| format!("Save failed: {}", e))
}
