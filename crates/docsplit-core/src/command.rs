//! JSON command surface for hosts that drive the core over a message channel.

use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::compress::{compress, CompressOptions};
use crate::document::{self, DocumentInfo};
use crate::error::{DocError, Stage};
use crate::pipeline::{prepare_for_upload, PrepareOptions};
use crate::split::split_if_needed;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum DocCommand {
    SplitIfNeeded {
        file: Vec<u8>,
        name: String,
    },
    Compress {
        file: Vec<u8>,
        #[serde(default = "default_true")]
        remove_metadata: bool,
    },
    Prepare {
        file: Vec<u8>,
        name: String,
        #[serde(default)]
        options: PrepareOptions,
    },
    Inspect {
        file: Vec<u8>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodedPart {
    pub name: String,
    /// Page range label, e.g. "21-40"
    pub pages: String,
    /// Base64-encoded PDF data
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    pub parts: Vec<EncodedPart>,
    pub info: Option<DocumentInfo>,
    pub error: Option<String>,
    pub stage: Option<Stage>,
    pub metrics: Option<ProcessMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
    pub processing_time_ms: u64,
}

struct Outcome {
    parts: Vec<EncodedPart>,
    info: Option<DocumentInfo>,
    output_size: usize,
    page_count: u32,
}

pub fn execute(command: DocCommand) -> ProcessResult {
    let started = Instant::now();
    let input_size = match &command {
        DocCommand::SplitIfNeeded { file, .. }
        | DocCommand::Compress { file, .. }
        | DocCommand::Prepare { file, .. }
        | DocCommand::Inspect { file } => file.len(),
    };

    match run(command) {
        Ok(outcome) => ProcessResult {
            success: true,
            parts: outcome.parts,
            info: outcome.info,
            error: None,
            stage: None,
            metrics: Some(ProcessMetrics {
                input_size_bytes: input_size,
                output_size_bytes: outcome.output_size,
                page_count: outcome.page_count,
                processing_time_ms: started.elapsed().as_millis() as u64,
            }),
        },
        Err(e) => ProcessResult {
            success: false,
            parts: Vec::new(),
            info: None,
            error: Some(e.to_string()),
            stage: Some(e.stage()),
            metrics: None,
        },
    }
}

fn encode(name: String, pages: String, bytes: &[u8]) -> EncodedPart {
    EncodedPart {
        name,
        pages,
        data: STANDARD.encode(bytes),
    }
}

fn run(command: DocCommand) -> Result<Outcome, DocError> {
    match command {
        DocCommand::SplitIfNeeded { file, name } => {
            let result = split_if_needed(&file, &name)?;
            let output_size = result.parts.iter().map(|p| p.bytes.len()).sum();
            Ok(Outcome {
                parts: result
                    .parts
                    .iter()
                    .map(|p| encode(p.name.clone(), p.pages_label(), &p.bytes))
                    .collect(),
                info: None,
                output_size,
                page_count: result.total_pages,
            })
        }
        DocCommand::Compress {
            file,
            remove_metadata,
        } => {
            let options = CompressOptions {
                remove_metadata,
                ..CompressOptions::default()
            };
            let result = compress(&file, &options)?;
            let page_count = document::page_count(&result.bytes)?;
            Ok(Outcome {
                parts: vec![encode(
                    "compressed.pdf".into(),
                    format!("1-{}", page_count),
                    &result.bytes,
                )],
                info: None,
                output_size: result.compressed_size,
                page_count,
            })
        }
        DocCommand::Prepare {
            file,
            name,
            options,
        } => {
            let parts = prepare_for_upload(&file, &name, &options)?;
            let output_size = parts.iter().map(|p| p.bytes.len()).sum();
            let page_count = parts.iter().map(|p| p.range.len()).sum();
            Ok(Outcome {
                parts: parts
                    .iter()
                    .map(|p| encode(p.name.clone(), p.range.to_string(), &p.bytes))
                    .collect(),
                info: None,
                output_size,
                page_count,
            })
        }
        DocCommand::Inspect { file } => {
            let info = document::inspect(&file)?;
            Ok(Outcome {
                parts: Vec::new(),
                output_size: 0,
                page_count: info.page_count,
                info: Some(info),
            })
        }
    }
}
