//! YAML configuration for the x12 tool

use anyhow::{Context, Result};
use edi_adapter_x12::{DelimiterOverrides, EnvelopeOptions, ParseOptions, PartyId};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Counter file used when neither the config nor `--counters` names one
pub const DEFAULT_COUNTER_FILE: &str = "x12-control-numbers.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Default interchange sender for `generate`
    pub sender: Option<PartyId>,
    /// Default interchange receiver for `generate`
    pub receiver: Option<PartyId>,
    pub envelope: EnvelopeOptions,
    /// Delimiters for input without an ISA header, and for generated output
    pub delimiters: DelimiterOverrides,
    /// Persistent control-number file
    pub control_numbers: Option<PathBuf>,
    pub max_input_bytes: Option<usize>,
}

impl CliConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            delimiters: self.delimiters,
            max_input_bytes: self.max_input_bytes,
        }
    }

    /// Counter file, preferring an explicit command-line path
    pub fn counter_file(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.control_numbers.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COUNTER_FILE))
    }
}
