//! ParityLab Runner — parity run orchestration around `paritylab-core`.
//!
//! This crate provides:
//! - TOML configuration with defaults matching the reference datapath
//! - Ticks CSV loading and writing
//! - Deterministic synthetic tick generation
//! - Single parity runs with report fingerprinting
//! - Shift sweeps ranked by match rate
//! - JSON/CSV artifact export

pub mod config;
pub mod export;
pub mod prices;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{ConfigError, EmaSection, ParityConfig, PathsSection, ReportSection};
pub use export::{
    export_comparison_csv, export_json, export_mismatches_csv, export_strategy_csv,
    export_sweep_csv, import_json, load_artifacts, save_artifacts, write_artifacts,
};
pub use prices::{
    load_closes, load_price_records, load_prices, prices_hash, write_price_records, PriceLoadError,
    PriceRecord,
};
pub use runner::{
    run_parity, run_parity_on, run_trace, Divergence, HwLogStats, ParityRun, RunError,
};
pub use sweep::{run_sweep, ShiftGrid, SweepEntry};
pub use synthetic::{SyntheticError, SyntheticSpec};
