//! Serializable parity-run configuration.
//!
//! ```toml
//! [ema]
//! fast_shift = 1
//! slow_shift = 6
//!
//! [paths]
//! ticks = "python_version/ticks.csv"
//! hw_log = "hw_log.txt"
//!
//! [report]
//! sample_rows = 12
//! mismatch_rows = 10
//! ```
//!
//! Every section and field is optional; missing values fall back to the
//! reference datapath defaults.

use paritylab_core::EmaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// EMA shifts; must equal the parameters synthesized into the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaSection {
    pub fast_shift: u32,
    pub slow_shift: u32,
}

impl Default for EmaSection {
    fn default() -> Self {
        let ema = EmaConfig::default();
        Self {
            fast_shift: ema.fast_shift,
            slow_shift: ema.slow_shift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Ticks CSV with a `price_q16` column.
    pub ticks: PathBuf,
    /// Hardware simulation log.
    pub hw_log: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            ticks: PathBuf::from("python_version/ticks.csv"),
            hw_log: PathBuf::from("hw_log.txt"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Comparison rows shown in the summary.
    pub sample_rows: usize,
    /// Mismatch rows shown in the summary.
    pub mismatch_rows: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            sample_rows: 12,
            mismatch_rows: 10,
        }
    }
}

/// Complete configuration for one parity run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParityConfig {
    pub ema: EmaSection,
    pub paths: PathsSection,
    pub report: ReportSection,
}

impl ParityConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn ema_config(&self) -> EmaConfig {
        EmaConfig::new(self.ema.fast_shift, self.ema.slow_shift)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
