//! Shift-based fixed-point EMA, bit-exact with the hardware accumulator.
//!
//! Recursive: avg[t] = avg[t-1] + ((x[t] - avg[t-1]) >> shift)
//! Seed: avg[0] = x[0].
//! Smoothing factor: 1 / 2^shift.
//!
//! The shift is arithmetic, so negative deltas round toward negative infinity
//! exactly as a two's-complement shift register does. Dividing by `2^shift`
//! instead would truncate toward zero and drift off the hardware by one LSB on
//! every falling sample.

use crate::domain::FixedPoint;

/// Running EMA state for one (series, shift) pair.
///
/// The state is `Copy` so a snapshot can be replayed: calling [`step`] twice on
/// the same state with the same input gives the same result.
///
/// [`step`]: FixedPointEma::step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPointEma {
    shift: u32,
    initialized: bool,
    avg: FixedPoint,
}

impl FixedPointEma {
    pub fn new(shift: u32) -> Self {
        Self {
            shift,
            initialized: false,
            avg: FixedPoint::ZERO,
        }
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Current average, `None` before the first sample.
    pub fn value(&self) -> Option<FixedPoint> {
        self.initialized.then_some(self.avg)
    }

    /// Feed one sample and return the updated average.
    pub fn update(&mut self, x: FixedPoint) -> FixedPoint {
        if self.initialized {
            let delta = x.wrapping_sub(self.avg);
            self.avg = self.avg.wrapping_add(delta.asr(self.shift));
        } else {
            self.avg = x;
            self.initialized = true;
        }
        self.avg
    }

    /// Pure form of [`update`](Self::update): returns the next state and the
    /// new average, leaving `self` untouched.
    pub fn step(self, x: FixedPoint) -> (Self, FixedPoint) {
        let mut next = self;
        let avg = next.update(x);
        (next, avg)
    }

    pub fn reset(&mut self) {
        self.initialized = false;
        self.avg = FixedPoint::ZERO;
    }
}

/// EMA of a whole series, one output per input.
pub fn fixed_ema_of_series(values: &[FixedPoint], shift: u32) -> Vec<FixedPoint> {
    let mut ema = FixedPointEma::new(shift);
    values.iter().map(|&x| ema.update(x)).collect()
}
