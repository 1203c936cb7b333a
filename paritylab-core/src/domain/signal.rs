//! Three-way trading signal and its hardware 2-bit encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;

/// Decision emitted on every tick.
///
/// The discriminants are the signed software domain (+1 / -1 / 0). The
/// hardware carries the same decision as a 2-bit code, see
/// [`Signal::from_hw_code`] and [`Signal::hw_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Sell = -1,
    Hold = 0,
    Buy = 1,
}

impl Signal {
    /// Signed value: BUY = 1, SELL = -1, HOLD = 0.
    pub const fn value(self) -> i8 {
        self as i8
    }

    /// Decode the hardware code: `1` is BUY (`2'b01`), `3` is SELL (`2'b11`),
    /// every other value is HOLD.
    pub const fn from_hw_code(code: u64) -> Self {
        match code {
            1 => Signal::Buy,
            3 => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    /// Encode for a hardware-format log line.
    pub const fn hw_code(self) -> u8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => 3,
            Signal::Hold => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

impl Neg for Signal {
    type Output = Signal;

    fn neg(self) -> Signal {
        match self {
            Signal::Buy => Signal::Sell,
            Signal::Sell => Signal::Buy,
            Signal::Hold => Signal::Hold,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
