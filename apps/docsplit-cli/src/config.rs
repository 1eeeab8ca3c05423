//! TOML configuration for the docsplit CLI
//!
//! Every section and field is optional; missing values fall back to the
//! core defaults (20 pages / 8 MiB, metadata removal on, object streams on).

use std::fs;
use std::path::Path;

use anyhow::Context;
use docsplit_core::{Budget, CompressOptions, ParseOptions, PrepareOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub budget: Budget,
    pub compress: CompressOptions,
    pub parse: ParseOptions,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.budget.validate()?;
        Ok(config)
    }

    /// Compression options with the `[parse]` section applied
    pub fn compress_options(&self) -> CompressOptions {
        CompressOptions {
            parse: self.parse,
            ..self.compress
        }
    }

    pub fn prepare_options(&self) -> PrepareOptions {
        PrepareOptions {
            budget: self.budget,
            compress: self.compress_options(),
            parse: self.parse,
        }
    }
}
