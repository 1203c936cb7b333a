//! ParityLab Core — fixed-point EMA crossover engine and HW/SW parity checker.
//!
//! This crate contains the parity path:
//! - Q16.16 domain types (fixed-point values, ticks, signals, traces)
//! - Shift-based fixed-point EMA, bit-exact with the hardware accumulator
//! - Crossover classifier and the software reference trace
//! - Hardware simulation log parser
//! - Tick-aligned parity comparator and report
//!
//! Plus the period-based float EMA snapshot used for market display, which is
//! kept apart from the parity path.

pub mod classifier;
pub mod domain;
pub mod error;
pub mod hw_log;
pub mod indicators;
pub mod parity;
pub mod snapshot;
pub mod sw_trace;

pub use classifier::classify;
pub use domain::{FixedPoint, ReportHash, Signal, Tick, Trace};
pub use error::ParityError;
pub use hw_log::{parse_hw_log, read_hw_log, render_hw_log, HwLog, HwRecord, HW_TICK_PATTERN};
pub use indicators::FixedPointEma;
pub use parity::{compare, ComparisonRow, Mismatch, ParityReport};
pub use snapshot::{snapshot, Crossover, MarketSnapshot, SnapshotError};
pub use sw_trace::{
    compute_detailed, compute_trace, crossover_count, EmaConfig, SignalCounts, TracePoint,
};
