//! Deterministic synthetic tick generator.
//!
//! Produces a noisy sine wave around a base price:
//!
//! `price[t] = base + amplitude * sin(2π t / period) + N(0, noise_sd)`
//!
//! and quantizes each price to Q16.16. The same seed always yields the same
//! series, so the hardware testbench and the software model can be fed from
//! one generated file.

use paritylab_core::FixedPoint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prices::PriceRecord;

#[derive(Debug, Error, PartialEq)]
pub enum SyntheticError {
    #[error("noise standard deviation must be finite and >= 0, got {0}")]
    InvalidNoise(f64),

    #[error("sine period must be > 0, got {0}")]
    InvalidPeriod(f64),
}

/// Parameters of the synthetic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSpec {
    pub num_points: usize,
    pub base: f64,
    pub amplitude: f64,
    /// Sine period in ticks.
    pub period: f64,
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            num_points: 400,
            base: 100.0,
            amplitude: 3.0,
            period: 18.0,
            noise_sd: 0.6,
            seed: 0,
        }
    }
}

impl SyntheticSpec {
    /// Generate the float prices.
    pub fn prices(&self) -> Result<Vec<f64>, SyntheticError> {
        if !self.period.is_finite() || self.period <= 0.0 {
            return Err(SyntheticError::InvalidPeriod(self.period));
        }
        // rand_distr accepts a negative std_dev and flips the noise sign.
        if !(self.noise_sd.is_finite() && self.noise_sd >= 0.0) {
            return Err(SyntheticError::InvalidNoise(self.noise_sd));
        }
        let noise = Normal::new(0.0, self.noise_sd)
            .map_err(|_| SyntheticError::InvalidNoise(self.noise_sd))?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        Ok((0..self.num_points)
            .map(|t| {
                let phase = 2.0 * std::f64::consts::PI * t as f64 / self.period;
                self.base + self.amplitude * phase.sin() + noise.sample(&mut rng)
            })
            .collect())
    }

    /// Generate ticks-file rows (`price`, `price_q16`).
    pub fn generate(&self) -> Result<Vec<PriceRecord>, SyntheticError> {
        let records: Vec<PriceRecord> = self
            .prices()?
            .into_iter()
            .map(PriceRecord::from_price)
            .collect();
        log::debug!(
            "generated {} synthetic ticks (seed {})",
            records.len(),
            self.seed
        );
        Ok(records)
    }

    /// Generate the Q16.16 series directly.
    pub fn fixed_prices(&self) -> Result<Vec<FixedPoint>, SyntheticError> {
        Ok(self.generate()?.iter().map(PriceRecord::fixed).collect())
    }
}
