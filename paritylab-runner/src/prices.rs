//! Price CSV loading and writing.
//!
//! The ticks file carries one row per tick in order, starting at tick 1:
//!
//! ```text
//! price,price_q16
//! 100.1268,6561937
//! ```
//!
//! Only `price_q16` feeds the parity path. The float `price` column is kept
//! for plotting and the market snapshot and may be absent.

use paritylab_core::FixedPoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceLoadError {
    #[error("price file not found: {path}: {reason}")]
    NotFound { path: PathBuf, reason: String },

    #[error("malformed price file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' missing from {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} row {row}: '{value}' is not a number")]
    BadValue {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("write price file {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// One row of the ticks file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    #[serde(default)]
    pub price: Option<f64>,
    pub price_q16: i64,
}

impl PriceRecord {
    pub fn from_price(price: f64) -> Self {
        Self {
            price: Some(price),
            price_q16: FixedPoint::from_f64(price).raw(),
        }
    }

    pub fn fixed(&self) -> FixedPoint {
        FixedPoint(self.price_q16)
    }
}

/// Load every row of a ticks CSV.
pub fn load_price_records(path: &Path) -> Result<Vec<PriceRecord>, PriceLoadError> {
    let mut reader = open_reader(path)?;
    reader
        .deserialize()
        .map(|row| {
            row.map_err(|source| PriceLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Load the Q16.16 prices of a ticks CSV in tick order.
pub fn load_prices(path: &Path) -> Result<Vec<FixedPoint>, PriceLoadError> {
    Ok(load_price_records(path)?
        .iter()
        .map(PriceRecord::fixed)
        .collect())
}

/// Load a float column (e.g. `close`) from any CSV with headers.
pub fn load_closes(path: &Path, column: &str) -> Result<Vec<f64>, PriceLoadError> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|source| PriceLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
        .ok_or_else(|| PriceLoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut closes = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|source| PriceLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = record.get(idx).unwrap_or("").trim();
        let value = raw.parse::<f64>().map_err(|_| PriceLoadError::BadValue {
            path: path.to_path_buf(),
            row: row + 1,
            value: raw.to_string(),
        })?;
        closes.push(value);
    }
    Ok(closes)
}

/// Write a ticks CSV (`price,price_q16`).
pub fn write_price_records(path: &Path, records: &[PriceRecord]) -> Result<(), PriceLoadError> {
    let write_err = |reason: String| PriceLoadError::Write {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))
}

/// BLAKE3 of the Q16.16 series (little-endian `i64`s), hex-encoded.
///
/// Identifies the exact input a report was produced from.
pub fn prices_hash(prices: &[FixedPoint]) -> String {
    let mut hasher = blake3::Hasher::new();
    for p in prices {
        hasher.update(&p.raw().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, PriceLoadError> {
    let file = std::fs::File::open(path).map_err(|e| PriceLoadError::NotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}
