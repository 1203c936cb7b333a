//! Period-based floating-point EMA used by the market snapshot.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! alpha = 2 / (period + 1)
//! Seed: EMA[0] = close[0].
//!
//! Deliberately separate from [`super::fixed_ema`]: different arithmetic
//! domain, different parameterization, and no parity requirement.

/// Smoothing multiplier for a period.
pub fn period_multiplier(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Compute EMA values for `closes`, one per input. Returns an empty vector for
/// empty input or `period == 0`.
pub fn period_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if closes.is_empty() || period == 0 {
        return Vec::new();
    }

    let alpha = period_multiplier(period);
    let mut result = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    result.push(prev);

    for &close in &closes[1..] {
        let ema = close * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    result
}
