//! Report export: JSON and CSV artifacts for a parity run.
//!
//! - **JSON**: the full `ParityRun`, schema-versioned
//! - **CSV**: mismatch list, full comparison table, detailed strategy trace
//!
//! Signals are written as `BUY` / `SELL` / `HOLD`, except in the strategy
//! table, whose `signal` column is numeric (+1 / -1 / 0) for plotting.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use paritylab_core::{ComparisonRow, Mismatch, TracePoint};

use crate::runner::{ParityRun, SCHEMA_VERSION};
use crate::sweep::SweepEntry;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ParityRun` to pretty JSON.
pub fn export_json(run: &ParityRun) -> Result<String> {
    serde_json::to_string_pretty(run).context("failed to serialize ParityRun to JSON")
}

/// Deserialize a `ParityRun` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ParityRun> {
    let run: ParityRun =
        serde_json::from_str(json).context("failed to deserialize ParityRun from JSON")?;
    if run.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            run.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(run)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: tick, hw, sw
pub fn export_mismatches_csv(mismatches: &[Mismatch]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["tick", "hw", "sw"])?;
    for m in mismatches {
        let tick = m.tick.to_string();
        wtr.write_record([tick.as_str(), m.hw.label(), m.sw.label()])?;
    }
    finish(wtr)
}

/// Columns: tick, hw, sw, match
pub fn export_comparison_csv(rows: &[ComparisonRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["tick", "hw", "sw", "match"])?;
    for r in rows {
        let tick = r.tick.to_string();
        let matched: &str = if r.matched { "true" } else { "false" };
        wtr.write_record([tick.as_str(), r.hw.label(), r.sw.label(), matched])?;
    }
    finish(wtr)
}

/// Detailed software trace.
///
/// Columns: tick, price, fast_ema, slow_ema, signal (+1 / -1 / 0), label,
/// price_q16, fast_q16, slow_q16
pub fn export_strategy_csv(points: &[TracePoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "tick",
        "price",
        "fast_ema",
        "slow_ema",
        "signal",
        "label",
        "price_q16",
        "fast_q16",
        "slow_q16",
    ])?;
    for p in points {
        let fields: [String; 9] = [
            p.tick.to_string(),
            format!("{:.6}", p.price.to_f64()),
            format!("{:.6}", p.fast.to_f64()),
            format!("{:.6}", p.slow.to_f64()),
            p.signal.value().to_string(),
            p.signal.label().to_string(),
            p.price.raw().to_string(),
            p.fast.raw().to_string(),
            p.slow.raw().to_string(),
        ];
        wtr.write_record(&fields)?;
    }
    finish(wtr)
}

/// Columns: fast_shift, slow_shift, compared, matches, mismatches,
/// match_rate, first_divergence
pub fn export_sweep_csv(entries: &[SweepEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "fast_shift",
        "slow_shift",
        "compared",
        "matches",
        "mismatches",
        "match_rate",
        "first_divergence",
    ])?;
    for e in entries {
        let fields: [String; 7] = [
            e.ema.fast_shift.to_string(),
            e.ema.slow_shift.to_string(),
            e.compared.to_string(),
            e.matches.to_string(),
            e.mismatches.to_string(),
            format!("{:.2}", e.match_rate),
            e.first_divergence.map(|t| t.to_string()).unwrap_or_default(),
        ];
        wtr.write_record(&fields)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a parity run.
///
/// Creates `parity_{timestamp}/` under `output_dir` containing:
/// - `report.json` — the full `ParityRun`
/// - `mismatches.csv`
/// - `comparison.csv`
/// - `fingerprint.txt` — BLAKE3 of the report
///
/// Returns the path to the created directory.
pub fn save_artifacts(run: &ParityRun, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("parity_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    write_artifacts(run, &run_dir)?;
    Ok(run_dir)
}

/// Write the artifact set into exactly `run_dir`.
pub fn write_artifacts(run: &ParityRun, run_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(run)?;
    write(run_dir, "report.json", &json)?;

    let mismatches = export_mismatches_csv(&run.report.mismatches)?;
    write(run_dir, "mismatches.csv", &mismatches)?;

    let comparison = export_comparison_csv(&run.report.rows)?;
    write(run_dir, "comparison.csv", &comparison)?;

    write(run_dir, "fingerprint.txt", &format!("{}\n", run.fingerprint))?;
    log::info!("artifacts written to {}", run_dir.display());
    Ok(())
}

/// Load a `ParityRun` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<ParityRun> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_parity_on;
    use paritylab_core::{
        compute_detailed, EmaConfig, FixedPoint, HwLog, Signal, Tick,
    };

    fn sample_run() -> ParityRun {
        let prices: Vec<FixedPoint> = [100, 90, 95, 110]
            .into_iter()
            .map(FixedPoint::from_int)
            .collect();
        // Tick 2 flipped to BUY in the hardware log.
        let log = HwLog::from_text(
            "tick 1 -> signal=0\ntick 2 -> signal=1\ntick 3 -> signal=3\ntick 4 -> signal=1\n",
        );
        run_parity_on(&prices, &log, EmaConfig::default()).unwrap()
    }

    #[test]
    fn json_round_trip() {
        let run = sample_run();
        let json = export_json(&run).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        assert_eq!(import_json(&json).unwrap(), run);
    }

    #[test]
    fn rejects_future_schema() {
        let mut run = sample_run();
        run.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&run).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn mismatch_csv_lists_ticks() {
        let csv = export_mismatches_csv(&[Mismatch {
            tick: Tick(3),
            hw: Signal::Hold,
            sw: Signal::Buy,
        }])
        .unwrap();
        assert_eq!(csv, "tick,hw,sw\n3,HOLD,BUY\n");
    }

    #[test]
    fn comparison_csv_has_row_per_tick() {
        let run = sample_run();
        let csv = export_comparison_csv(&run.report.rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "tick,hw,sw,match");
        assert_eq!(lines.len(), 1 + run.report.compared);
        assert!(lines[2].starts_with("2,BUY,SELL,false"));
    }

    #[test]
    fn comparison_csv_writes_match_flag() {
        let run = sample_run();
        let csv = export_comparison_csv(&run.report.rows).unwrap();
        assert_eq!(
            csv,
            "tick,hw,sw,match\n1,HOLD,HOLD,true\n2,BUY,SELL,false\n3,SELL,SELL,true\n4,BUY,BUY,true\n"
        );
    }

    #[test]
    fn strategy_csv_columns() {
        let prices = [FixedPoint::from_int(100), FixedPoint::from_int(90)];
        let points = compute_detailed(&prices, EmaConfig::default()).unwrap();
        let csv = export_strategy_csv(&points).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "tick,price,fast_ema,slow_ema,signal,label,price_q16,fast_q16,slow_q16"
        );
        assert_eq!(
            lines[1],
            "1,100.000000,100.000000,100.000000,0,HOLD,6553600,6553600,6553600"
        );
        // fast = 95.0, slow = 100 - 10/64 rounded down to the next Q16.16 step.
        assert_eq!(
            lines[2],
            "2,90.000000,95.000000,99.843750,-1,SELL,5898240,6225920,6543360"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let run = sample_run();
        let run_dir = save_artifacts(&run, dir.path()).unwrap();

        for name in ["report.json", "mismatches.csv", "comparison.csv", "fingerprint.txt"] {
            assert!(run_dir.join(name).exists(), "{name} missing");
        }
        let fp = std::fs::read_to_string(run_dir.join("fingerprint.txt")).unwrap();
        assert_eq!(fp.trim(), run.fingerprint.0);
        assert_eq!(load_artifacts(&run_dir).unwrap(), run);
    }
}
