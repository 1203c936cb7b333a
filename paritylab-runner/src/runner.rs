//! Parity run orchestration: load prices and the hardware log, compute the
//! software trace, compare, fingerprint.

use std::path::PathBuf;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paritylab_core::{
    compare, compute_detailed, read_hw_log, EmaConfig, FixedPoint, HwLog, ParityError,
    ParityReport, ReportHash, Signal, SignalCounts, Tick, Trace, TracePoint,
};

use crate::config::{ConfigError, ParityConfig};
use crate::prices::{load_prices, prices_hash, PriceLoadError};

/// Errors from a full parity run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("price data error: {0}")]
    Prices(#[from] PriceLoadError),
    #[error(transparent)]
    Parity(#[from] ParityError),
}

impl RunError {
    /// The core parity condition behind this error, if any.
    pub fn parity(&self) -> Option<&ParityError> {
        match self {
            RunError::Parity(e) => Some(e),
            _ => None,
        }
    }
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Hardware log bookkeeping carried into the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwLogStats {
    pub records: usize,
    pub duplicates: usize,
    pub skipped_lines: usize,
}

impl From<&HwLog> for HwLogStats {
    fn from(log: &HwLog) -> Self {
        Self {
            records: log.len(),
            duplicates: log.duplicates,
            skipped_lines: log.skipped_lines,
        }
    }
}

/// Both models' state at the first mismatching tick.
///
/// The hardware accumulators are only known when the log line carried
/// `fast=`/`slow=` dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub tick: Tick,
    pub price: FixedPoint,
    pub hw: Signal,
    pub sw: Signal,
    pub hw_fast: Option<FixedPoint>,
    pub hw_slow: Option<FixedPoint>,
    pub sw_fast: FixedPoint,
    pub sw_slow: FixedPoint,
}

impl Divergence {
    /// `Some(true)` when both accumulators agree, which points at the
    /// decision logic rather than the EMA datapath. `None` without dumps.
    pub fn accumulators_match(&self) -> Option<bool> {
        Some(self.hw_fast? == self.sw_fast && self.hw_slow? == self.sw_slow)
    }
}

fn first_divergence(
    report: &ParityReport,
    points: &[TracePoint],
    hw_log: &HwLog,
) -> Option<Divergence> {
    let mismatch = report.first_divergence()?;
    let point = points.iter().find(|p| p.tick == mismatch.tick)?;
    let record = hw_log.record(mismatch.tick);
    Some(Divergence {
        tick: mismatch.tick,
        price: point.price,
        hw: mismatch.hw,
        sw: mismatch.sw,
        hw_fast: record.and_then(|r| r.fast),
        hw_slow: record.and_then(|r| r.slow),
        sw_fast: point.fast,
        sw_slow: point.slow,
    })
}

/// Everything produced by one parity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityRun {
    pub schema_version: u32,
    pub ema: EmaConfig,
    pub ticks_path: PathBuf,
    pub hw_log_path: PathBuf,
    /// BLAKE3 of the input price series.
    pub prices_hash: String,
    pub hw_log: HwLogStats,
    pub sw_counts: SignalCounts,
    pub hw_counts: SignalCounts,
    pub report: ParityReport,
    #[serde(default)]
    pub divergence: Option<Divergence>,
    pub fingerprint: ReportHash,
}

/// Run the software model over the configured ticks file and compare it to
/// the configured hardware log.
pub fn run_parity(config: &ParityConfig) -> Result<ParityRun, RunError> {
    let prices = load_prices(&config.paths.ticks)?;
    info!(
        "loaded {} ticks from {}",
        prices.len(),
        config.paths.ticks.display()
    );
    let hw_log = read_hw_log(&config.paths.hw_log)?;
    info!(
        "parsed {} hardware records from {} ({} duplicates, {} other lines)",
        hw_log.len(),
        config.paths.hw_log.display(),
        hw_log.duplicates,
        hw_log.skipped_lines
    );

    let mut run = run_parity_on(&prices, &hw_log, config.ema_config())?;
    run.ticks_path = config.paths.ticks.clone();
    run.hw_log_path = config.paths.hw_log.clone();
    Ok(run)
}

/// Compare an in-memory price series against a parsed hardware log.
pub fn run_parity_on(
    prices: &[FixedPoint],
    hw_log: &HwLog,
    ema: EmaConfig,
) -> Result<ParityRun, RunError> {
    let points = compute_detailed(prices, ema)?;
    let sw: Trace = points.iter().map(|p| (p.tick, p.signal)).collect();
    let hw = hw_log.trace();

    let report = compare(&hw, &sw)?;
    let fingerprint = report.fingerprint();
    let divergence = first_divergence(&report, &points, hw_log);
    info!(
        "compared {} ticks: {}% match, {} mismatches (fast_shift={}, slow_shift={})",
        report.compared,
        report.match_rate_display(),
        report.mismatch_count(),
        ema.fast_shift,
        ema.slow_shift
    );

    Ok(ParityRun {
        schema_version: SCHEMA_VERSION,
        ema,
        ticks_path: PathBuf::new(),
        hw_log_path: PathBuf::new(),
        prices_hash: prices_hash(prices),
        hw_log: HwLogStats::from(hw_log),
        sw_counts: SignalCounts::from_trace(&sw),
        hw_counts: SignalCounts::from_trace(&hw),
        report,
        divergence,
        fingerprint,
    })
}

/// Software-only pass over a ticks file: the detailed trace for export.
pub fn run_trace(config: &ParityConfig) -> Result<Vec<TracePoint>, RunError> {
    let prices = load_prices(&config.paths.ticks)?;
    let points = compute_detailed(&prices, config.ema_config())?;
    info!(
        "computed {} trace points (fast_shift={}, slow_shift={})",
        points.len(),
        config.ema.fast_shift,
        config.ema.slow_shift
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paritylab_core::render_hw_log;

    fn prices() -> Vec<FixedPoint> {
        [100.0, 101.5, 99.25, 98.0, 102.75, 103.0, 101.0]
            .into_iter()
            .map(FixedPoint::from_f64)
            .collect()
    }

    #[test]
    fn rendered_log_is_full_parity() {
        let prices = prices();
        let points = compute_detailed(&prices, EmaConfig::default()).unwrap();
        let log = HwLog::from_text(&render_hw_log(&points));

        let run = run_parity_on(&prices, &log, EmaConfig::default()).unwrap();
        assert!(run.report.is_full_parity());
        assert_eq!(run.report.compared, prices.len());
        assert_eq!(run.sw_counts, run.hw_counts);
        assert_eq!(run.hw_log.records, prices.len());
        assert_eq!(run.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn fingerprint_is_stable() {
        let prices = prices();
        let log = HwLog::from_text("tick 1 -> signal=0\ntick 2 -> signal=1\n");
        let a = run_parity_on(&prices, &log, EmaConfig::default()).unwrap();
        let b = run_parity_on(&prices, &log, EmaConfig::default()).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.report.compared, 2);
    }

    #[test]
    fn empty_prices_is_parity_error() {
        let log = HwLog::from_text("tick 1 -> signal=0\n");
        let err = run_parity_on(&[], &log, EmaConfig::default()).unwrap_err();
        assert!(matches!(err.parity(), Some(ParityError::EmptyInput)));
    }

    #[test]
    fn divergence_carries_both_accumulators() {
        let prices = prices();
        let points = compute_detailed(&prices, EmaConfig::default()).unwrap();
        let p3 = points[2];
        // Same accumulators as the software model, flipped decision.
        let text = format!(
            "tick 1 -> signal=0\ntick 2 -> signal={}\ntick 3 -> signal={}  fast={} slow={}\n",
            points[1].signal.hw_code(),
            (-p3.signal).hw_code(),
            p3.fast.raw(),
            p3.slow.raw()
        );
        let run = run_parity_on(&prices, &HwLog::from_text(&text), EmaConfig::default()).unwrap();

        let div = run.divergence.unwrap();
        assert_eq!(div.tick, Tick(3));
        assert_eq!(div.price, prices[2]);
        assert_eq!(div.sw, p3.signal);
        assert_eq!(div.hw, -p3.signal);
        assert_eq!((div.sw_fast, div.sw_slow), (p3.fast, p3.slow));
        assert_eq!((div.hw_fast, div.hw_slow), (Some(p3.fast), Some(p3.slow)));
        assert_eq!(div.accumulators_match(), Some(true));
    }

    #[test]
    fn divergence_without_dumps_or_mismatches() {
        let prices = prices();
        let points = compute_detailed(&prices, EmaConfig::default()).unwrap();

        let clean = HwLog::from_text(&render_hw_log(&points));
        let run = run_parity_on(&prices, &clean, EmaConfig::default()).unwrap();
        assert_eq!(run.divergence, None);

        let text = format!("tick 2 -> signal={}\n", (-points[1].signal).hw_code());
        let run = run_parity_on(&prices, &HwLog::from_text(&text), EmaConfig::default()).unwrap();
        let div = run.divergence.unwrap();
        assert_eq!(div.hw_fast, None);
        assert_eq!(div.accumulators_match(), None);
        assert_eq!(div.sw_fast, points[1].fast);
    }

    #[test]
    fn hw_counts_follow_decoded_codes() {
        let prices = prices();
        let log = HwLog::from_text("tick 1 -> signal=1\ntick 2 -> signal=3\ntick 3 -> signal=2\n");
        let run = run_parity_on(&prices, &log, EmaConfig::default()).unwrap();
        assert_eq!(run.hw_counts.buy, 1);
        assert_eq!(run.hw_counts.sell, 1);
        assert_eq!(run.hw_counts.hold, 1);
        assert_eq!(
            run.report.rows[2].hw,
            Signal::Hold,
            "code 2 decodes to HOLD"
        );
    }
}
