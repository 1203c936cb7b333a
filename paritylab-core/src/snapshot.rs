//! Market snapshot — latest period-EMA crossover state of a close series.
//!
//! This is the presentation-side signal: float prices, period-based EMAs
//! (12/26 by default), and a check for a crossover on the most recent bar. It
//! shares the BUY/SELL/HOLD vocabulary with the parity path but none of its
//! arithmetic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Signal;
use crate::indicators::period_ema;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("not enough data points: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid periods: fast={fast}, slow={slow} (need 1 <= fast < slow)")]
    InvalidPeriods { fast: usize, slow: usize },
}

/// Crossover on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    /// Fast crossed above slow.
    Bullish,
    /// Fast crossed below slow.
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub fast_period: usize,
    pub slow_period: usize,
    pub last_close: f64,
    pub high: f64,
    pub low: f64,
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub signal: Signal,
    pub crossover: Option<Crossover>,
    /// Last `n` closes, oldest first.
    pub recent: Vec<f64>,
}

impl MarketSnapshot {
    /// `fast - slow` as a percentage of `slow`.
    pub fn spread_pct(&self) -> f64 {
        if self.slow_ema == 0.0 {
            return 0.0;
        }
        (self.fast_ema - self.slow_ema) / self.slow_ema * 100.0
    }

    pub fn reason(&self) -> &'static str {
        match self.signal {
            Signal::Buy => "Fast EMA is ABOVE Slow EMA (upward momentum)",
            Signal::Sell => "Fast EMA is BELOW Slow EMA (downward momentum)",
            Signal::Hold => "EMAs are equal (no clear trend)",
        }
    }
}

/// Number of trailing closes kept in [`MarketSnapshot::recent`].
pub const RECENT_CLOSES: usize = 5;

/// Build a snapshot from a close series. Needs at least `slow_period` closes.
pub fn snapshot(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
) -> Result<MarketSnapshot, SnapshotError> {
    if fast_period == 0 || fast_period >= slow_period {
        return Err(SnapshotError::InvalidPeriods {
            fast: fast_period,
            slow: slow_period,
        });
    }
    // A crossover needs a previous bar as well.
    let needed = slow_period.max(2);
    if closes.len() < needed {
        return Err(SnapshotError::InsufficientData {
            needed,
            got: closes.len(),
        });
    }

    let fast = period_ema(closes, fast_period);
    let slow = period_ema(closes, slow_period);
    let n = closes.len();
    let (fast_cur, slow_cur) = (fast[n - 1], slow[n - 1]);
    let (fast_prev, slow_prev) = (fast[n - 2], slow[n - 2]);

    let signal = if fast_cur > slow_cur {
        Signal::Buy
    } else if fast_cur < slow_cur {
        Signal::Sell
    } else {
        Signal::Hold
    };

    let crossover = if fast_prev <= slow_prev && fast_cur > slow_cur {
        Some(Crossover::Bullish)
    } else if fast_prev >= slow_prev && fast_cur < slow_cur {
        Some(Crossover::Bearish)
    } else {
        None
    };

    let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = closes.iter().copied().fold(f64::INFINITY, f64::min);

    Ok(MarketSnapshot {
        fast_period,
        slow_period,
        last_close: closes[n - 1],
        high,
        low,
        fast_ema: fast_cur,
        slow_ema: slow_cur,
        signal,
        crossover,
        recent: closes[n.saturating_sub(RECENT_CLOSES)..].to_vec(),
    })
}
