//! Software reference trace — two fixed-point EMAs and the classifier, tick by
//! tick, over a materialized price sequence.

use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::domain::{FixedPoint, Signal, Tick, Trace};
use crate::error::ParityError;
use crate::indicators::FixedPointEma;

/// EMA shifts shared by the software model and the hardware under test.
///
/// Defaults match the reference datapath: fast = 1/2, slow = 1/64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmaConfig {
    pub fast_shift: u32,
    pub slow_shift: u32,
}

impl EmaConfig {
    pub const fn new(fast_shift: u32, slow_shift: u32) -> Self {
        Self {
            fast_shift,
            slow_shift,
        }
    }
}

impl Default for EmaConfig {
    fn default() -> Self {
        Self::new(1, 6)
    }
}

/// One row of the detailed software trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracePoint {
    pub tick: Tick,
    pub price: FixedPoint,
    pub fast: FixedPoint,
    pub slow: FixedPoint,
    pub signal: Signal,
}

/// Run both EMAs over `prices` and keep every intermediate value.
///
/// Output has exactly one point per price, ticks `1..=prices.len()`.
pub fn compute_detailed(
    prices: &[FixedPoint],
    config: EmaConfig,
) -> Result<Vec<TracePoint>, ParityError> {
    if prices.is_empty() {
        return Err(ParityError::EmptyInput);
    }

    let mut fast_ema = FixedPointEma::new(config.fast_shift);
    let mut slow_ema = FixedPointEma::new(config.slow_shift);

    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let fast = fast_ema.update(price);
            let slow = slow_ema.update(price);
            TracePoint {
                tick: Tick::from_index(i),
                price,
                fast,
                slow,
                signal: classify(fast, slow),
            }
        })
        .collect();

    Ok(points)
}

/// Software signal trace for `prices`.
pub fn compute_trace(prices: &[FixedPoint], config: EmaConfig) -> Result<Trace, ParityError> {
    Ok(compute_detailed(prices, config)?
        .into_iter()
        .map(|p| (p.tick, p.signal))
        .collect())
}

/// BUY / SELL / HOLD tallies for a trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl SignalCounts {
    pub fn from_trace(trace: &Trace) -> Self {
        let mut counts = Self::default();
        for (_, signal) in trace.iter() {
            match signal {
                Signal::Buy => counts.buy += 1,
                Signal::Sell => counts.sell += 1,
                Signal::Hold => counts.hold += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }
}

/// Number of BUY <-> SELL reversals in tick order.
///
/// HOLD ticks are skipped: BUY, HOLD, SELL counts as one reversal, BUY, HOLD,
/// BUY as none.
pub fn crossover_count(trace: &Trace) -> usize {
    let mut last: Option<Signal> = None;
    let mut count = 0;
    for (_, signal) in trace.iter() {
        if signal == Signal::Hold {
            continue;
        }
        if matches!(last, Some(prev) if prev != signal) {
            count += 1;
        }
        last = Some(signal);
    }
    count
}
