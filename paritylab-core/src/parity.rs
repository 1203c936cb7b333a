//! HW/SW parity comparison.
//!
//! Joins two traces on tick (inner join), walks the shared ticks in ascending
//! order, and records every disagreement. Ticks present in only one trace are
//! counted but never enter the match-rate denominator.

use serde::{Deserialize, Serialize};

use crate::domain::{ReportHash, Signal, Tick, Trace};
use crate::error::ParityError;

/// One compared tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub tick: Tick,
    pub hw: Signal,
    pub sw: Signal,
    pub matched: bool,
}

/// A tick where hardware and software disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub tick: Tick,
    pub hw: Signal,
    pub sw: Signal,
}

/// Outcome of a parity comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityReport {
    /// Ticks present in both traces.
    pub compared: usize,
    pub matches: usize,
    /// Mismatches in ascending tick order.
    pub mismatches: Vec<Mismatch>,
    /// Every compared tick in ascending order.
    pub rows: Vec<ComparisonRow>,
    /// Ticks only the hardware trace has.
    pub hw_only: usize,
    /// Ticks only the software trace has.
    pub sw_only: usize,
}

impl ParityReport {
    /// Match rate in percent, `0.0..=100.0`.
    pub fn match_rate(&self) -> f64 {
        if self.compared == 0 {
            return 0.0;
        }
        self.matches as f64 * 100.0 / self.compared as f64
    }

    /// Match rate rendered with two decimals, e.g. `"50.00"`.
    pub fn match_rate_display(&self) -> String {
        format!("{:.2}", self.match_rate())
    }

    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_full_parity(&self) -> bool {
        self.compared > 0 && self.mismatches.is_empty()
    }

    /// Earliest tick where the two models diverge.
    pub fn first_divergence(&self) -> Option<Mismatch> {
        self.mismatches.first().copied()
    }

    /// First `n` comparison rows, for display.
    pub fn sample(&self, n: usize) -> &[ComparisonRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// BLAKE3 fingerprint of the report's canonical JSON.
    ///
    /// Identical inputs always produce the same fingerprint.
    pub fn fingerprint(&self) -> ReportHash {
        let json = serde_json::to_vec(self).expect("ParityReport must serialize");
        ReportHash::from_bytes(&json)
    }
}

/// Compare a hardware trace against a software trace.
///
/// Fails with [`ParityError::NoOverlap`] when the traces share no tick.
pub fn compare(hw: &Trace, sw: &Trace) -> Result<ParityReport, ParityError> {
    let rows: Vec<ComparisonRow> = hw
        .iter()
        .filter_map(|(tick, hw_sig)| {
            sw.get(tick).map(|sw_sig| ComparisonRow {
                tick,
                hw: hw_sig,
                sw: sw_sig,
                matched: hw_sig == sw_sig,
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(ParityError::NoOverlap);
    }

    let mismatches: Vec<Mismatch> = rows
        .iter()
        .filter(|r| !r.matched)
        .map(|r| Mismatch {
            tick: r.tick,
            hw: r.hw,
            sw: r.sw,
        })
        .collect();

    let compared = rows.len();
    Ok(ParityReport {
        compared,
        matches: compared - mismatches.len(),
        mismatches,
        rows,
        hw_only: hw.len() - compared,
        sw_only: sw.len() - compared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(entries: &[(u64, Signal)]) -> Trace {
        entries.iter().map(|&(t, s)| (Tick(t), s)).collect()
    }

    #[test]
    fn inner_join_example() {
        let hw = trace(&[(1, Signal::Buy), (2, Signal::Sell), (3, Signal::Hold)]);
        let sw = trace(&[(2, Signal::Sell), (3, Signal::Buy), (4, Signal::Hold)]);

        let report = compare(&hw, &sw).unwrap();
        assert_eq!(report.compared, 2);
        assert_eq!(report.matches, 1);
        assert_eq!(
            report.mismatches,
            vec![Mismatch {
                tick: Tick(3),
                hw: Signal::Hold,
                sw: Signal::Buy
            }]
        );
        assert_eq!(report.match_rate_display(), "50.00");
        assert_eq!(report.hw_only, 1);
        assert_eq!(report.sw_only, 1);
        let ticks: Vec<u64> = report.rows.iter().map(|r| r.tick.get()).collect();
        assert_eq!(ticks, vec![2, 3]);
    }

    #[test]
    fn no_overlap_is_an_error() {
        let hw = trace(&[(1, Signal::Buy)]);
        let sw = trace(&[(2, Signal::Buy)]);
        assert!(matches!(compare(&hw, &sw), Err(ParityError::NoOverlap)));
        assert!(matches!(
            compare(&Trace::new(), &Trace::new()),
            Err(ParityError::NoOverlap)
        ));
    }

    #[test]
    fn identical_traces_are_full_parity() {
        let t = trace(&[(1, Signal::Hold), (2, Signal::Buy), (3, Signal::Sell)]);
        let report = compare(&t, &t).unwrap();
        assert!(report.is_full_parity());
        assert_eq!(report.match_rate_display(), "100.00");
        assert_eq!(report.first_divergence(), None);
    }

    #[test]
    fn mismatches_are_tick_ordered() {
        let hw = trace(&[(9, Signal::Buy), (4, Signal::Buy), (6, Signal::Sell)]);
        let sw = trace(&[(4, Signal::Sell), (6, Signal::Sell), (9, Signal::Hold)]);
        let report = compare(&hw, &sw).unwrap();
        let ticks: Vec<u64> = report.mismatches.iter().map(|m| m.tick.get()).collect();
        assert_eq!(ticks, vec![4, 9]);
        assert_eq!(report.first_divergence().map(|m| m.tick), Some(Tick(4)));
    }

    #[test]
    fn two_decimal_rounding() {
        // 2 of 3 -> 66.666...%
        let hw = trace(&[(1, Signal::Buy), (2, Signal::Buy), (3, Signal::Buy)]);
        let sw = trace(&[(1, Signal::Buy), (2, Signal::Buy), (3, Signal::Sell)]);
        let report = compare(&hw, &sw).unwrap();
        assert_eq!(report.match_rate_display(), "66.67");
    }

    #[test]
    fn sample_is_clamped() {
        let t = trace(&[(1, Signal::Buy), (2, Signal::Buy)]);
        let report = compare(&t, &t).unwrap();
        assert_eq!(report.sample(12).len(), 2);
        assert_eq!(report.sample(1).len(), 1);
    }

    #[test]
    fn report_is_deterministic() {
        let hw = trace(&[(1, Signal::Buy), (2, Signal::Sell), (3, Signal::Hold)]);
        let sw = trace(&[(1, Signal::Sell), (2, Signal::Sell), (3, Signal::Hold)]);
        let a = compare(&hw, &sw).unwrap();
        let b = compare(&hw, &sw).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
