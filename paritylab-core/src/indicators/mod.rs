//! Moving-average filters.
//!
//! Two unrelated EMAs live here:
//! - `fixed_ema`: Q16.16 shift-based recurrence that must match the hardware
//!   datapath bit for bit. Used by the software trace and the parity check.
//! - `period_ema`: floating-point, period-based EMA for the market snapshot.
//!   It has no parity requirement and is never fed into the comparator.

pub mod fixed_ema;
pub mod period_ema;

pub use fixed_ema::{fixed_ema_of_series, FixedPointEma};
pub use period_ema::{period_ema, period_multiplier};
