//! Q16.16 fixed-point values.
//!
//! A `FixedPoint` is a signed 64-bit integer with 16 fractional bits. Inside the
//! parity path every operation is integer-only; the `f64` conversions exist for
//! the boundaries (synthetic generation, display) and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Q16.16 fixed-point number stored in an `i64`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint(pub i64);

impl FixedPoint {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = 16;
    /// Scale factor, `2^16`.
    pub const SCALE: i64 = 1 << Self::FRAC_BITS;
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Whole units, e.g. `from_int(100)` is 100.0.
    pub const fn from_int(units: i64) -> Self {
        Self(units << Self::FRAC_BITS)
    }

    /// Convert a float price at the boundary.
    ///
    /// Rounds half to even, so a price exactly between two representable
    /// values lands on the even raw integer.
    pub fn from_f64(value: f64) -> Self {
        Self((value * Self::SCALE as f64).round_ties_even() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Two's-complement subtraction. Wraps like a hardware register instead of
    /// panicking on overflow.
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Arithmetic (sign-preserving) right shift.
    ///
    /// Rounds toward negative infinity: `-5 >> 1 == -3`, not `-2`. Shifts of 64
    /// or more sign-fill to `0` or `-1`.
    pub const fn asr(self, shift: u32) -> Self {
        let shift = if shift > 63 { 63 } else { shift };
        Self(self.0 >> shift)
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
