//! EMA crossover classifier.
//!
//! Mirrors the hardware comparator: exact signed comparison of the two
//! averages, no tolerance band.

use crate::domain::{FixedPoint, Signal};

/// BUY when the fast average is above the slow one, SELL when below, HOLD on
/// an exact tie.
pub fn classify(fast: FixedPoint, slow: FixedPoint) -> Signal {
    match fast.cmp(&slow) {
        std::cmp::Ordering::Greater => Signal::Buy,
        std::cmp::Ordering::Less => Signal::Sell,
        std::cmp::Ordering::Equal => Signal::Hold,
    }
}
