//! docsplit - prepare PDF documents for upload
//!
//! Splits documents that exceed the page budget and compresses the results.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsplit_core::{
    compress, execute, inspect, prepare_for_upload, read_from, split_with_budget, DocCommand,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "docsplit")]
#[command(version, about = "Split and compress PDF documents for upload")]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show page count, version and metadata
    Info { file: PathBuf },
    /// Split a document that exceeds the page budget
    Split {
        file: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Rewrite a document with object streams
    Compress {
        file: PathBuf,
        /// Keep title, author and the other descriptive fields
        #[arg(long)]
        keep_metadata: bool,
        #[arg(long)]
        no_object_streams: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split if needed, then compress every part
    Prepare {
        file: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Run a JSON command read from stdin
    Exec,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for --json and exec
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docsplit=info,docsplit_core=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Info { file } => {
            let bytes = read_file(&file)?;
            let info = inspect(&bytes)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("pages:     {}", info.page_count);
                println!("version:   {}", info.version);
                println!("size:      {} bytes", info.size_bytes);
                println!("encrypted: {}", info.encrypted);
                println!("title:     {}", info.title.as_deref().unwrap_or("-"));
                println!("author:    {}", info.author.as_deref().unwrap_or("-"));
            }
        }
        Command::Split { file, out_dir } => {
            let bytes = read_file(&file)?;
            let result =
                split_with_budget(&bytes, &file_name(&file), &config.budget, &config.parse)?;
            if !result.was_split {
                info!("{} is within budget, nothing to split", file.display());
            } else {
                for part in &result.parts {
                    write_file(&out_dir.join(&part.name), &part.bytes)?;
                }
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for part in &result.parts {
                    println!("{}\tpages {}", part.name, part.pages_label());
                }
            }
        }
        Command::Compress {
            file,
            keep_metadata,
            no_object_streams,
            output,
        } => {
            let bytes = read_file(&file)?;
            let mut options = config.compress_options();
            options.remove_metadata &= !keep_metadata;
            options.use_object_streams &= !no_object_streams;

            let result = compress(&bytes, &options)?;
            let output = output.unwrap_or_else(|| compressed_path(&file));
            write_file(&output, &result.bytes)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "{} -> {} bytes ({:.1}%) {}",
                    result.original_size,
                    result.compressed_size,
                    result.compression_ratio,
                    output.display()
                );
            }
        }
        Command::Prepare { file, out_dir } => {
            let bytes = read_file(&file)?;
            let parts =
                prepare_for_upload(&bytes, &file_name(&file), &config.prepare_options())?;
            for part in &parts {
                write_file(&out_dir.join(&part.name), &part.bytes)?;
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&parts)?);
            } else {
                for part in &parts {
                    println!(
                        "{}\tpages {}\t{} bytes{}",
                        part.name,
                        part.range,
                        part.bytes.len(),
                        if part.compressed { " (compressed)" } else { "" }
                    );
                }
            }
        }
        Command::Exec => {
            let input = read_from(io::stdin().lock())?;
            let command: DocCommand =
                serde_json::from_slice(&input).context("Failed to parse JSON command")?;
            let result = execute(command);
            let mut stdout = io::stdout().lock();
            serde_json::to_writer(&mut stdout, &result)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_from(file).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), size = bytes.len(), "wrote file");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string())
}

/// `informe.pdf` -> `informe.min.pdf`
fn compressed_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!("{}.min.pdf", stem))
}
