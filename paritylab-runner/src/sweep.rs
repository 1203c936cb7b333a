//! Shift sweep: evaluate parity for a grid of (fast_shift, slow_shift)
//! pairs against one hardware trace.
//!
//! Useful when the shifts synthesized into the hardware are unknown or
//! suspected to differ from the software configuration: the pair that
//! reproduces the log best ranks first.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use paritylab_core::{compare, compute_trace, EmaConfig, FixedPoint, ParityError, Trace};

/// Shift grid specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftGrid {
    pub fast_shifts: Vec<u32>,
    pub slow_shifts: Vec<u32>,
}

impl Default for ShiftGrid {
    /// Fast 0..=4 against slow 2..=10.
    fn default() -> Self {
        Self {
            fast_shifts: (0..=4).collect(),
            slow_shifts: (2..=10).collect(),
        }
    }
}

impl ShiftGrid {
    pub fn new(fast_shifts: Vec<u32>, slow_shifts: Vec<u32>) -> Self {
        Self {
            fast_shifts,
            slow_shifts,
        }
    }

    /// All configurations in the grid, in grid order.
    ///
    /// Pairs with `fast >= slow` are skipped: the fast average must react
    /// faster than the slow one for the crossover to mean anything.
    pub fn configs(&self) -> Vec<EmaConfig> {
        let mut configs = Vec::new();
        for &fast in &self.fast_shifts {
            for &slow in &self.slow_shifts {
                if fast >= slow {
                    continue;
                }
                configs.push(EmaConfig::new(fast, slow));
            }
        }
        configs
    }

    pub fn size(&self) -> usize {
        self.configs().len()
    }
}

/// Parity of one shift pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub ema: EmaConfig,
    pub compared: usize,
    pub matches: usize,
    pub mismatches: usize,
    /// Match rate in percent.
    pub match_rate: f64,
    pub first_divergence: Option<u64>,
}

impl SweepEntry {
    fn evaluate(prices: &[FixedPoint], hw: &Trace, ema: EmaConfig) -> Result<Self, ParityError> {
        let sw = compute_trace(prices, ema)?;
        let report = compare(hw, &sw)?;
        Ok(Self {
            ema,
            compared: report.compared,
            matches: report.matches,
            mismatches: report.mismatch_count(),
            match_rate: report.match_rate(),
            first_divergence: report.first_divergence().map(|m| m.tick.get()),
        })
    }
}

/// Run a sweep. Results are sorted by match rate (descending), then fast
/// shift, then slow shift, so serial and parallel runs agree exactly.
pub fn run_sweep(
    prices: &[FixedPoint],
    hw: &Trace,
    grid: &ShiftGrid,
    parallel: bool,
) -> Result<Vec<SweepEntry>, ParityError> {
    let configs = grid.configs();

    let mut entries: Vec<SweepEntry> = if parallel {
        configs
            .par_iter()
            .map(|&ema| SweepEntry::evaluate(prices, hw, ema))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        configs
            .iter()
            .map(|&ema| SweepEntry::evaluate(prices, hw, ema))
            .collect::<Result<Vec<_>, _>>()?
    };

    entries.sort_by(|a, b| {
        b.match_rate
            .total_cmp(&a.match_rate)
            .then(a.ema.fast_shift.cmp(&b.ema.fast_shift))
            .then(a.ema.slow_shift.cmp(&b.ema.slow_shift))
    });
    log::info!("swept {} shift pairs", entries.len());
    Ok(entries)
}
