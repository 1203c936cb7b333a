//! Parity path scenarios: the documented comparator example, the shift
//! rounding case, and the hardware log file boundary.

use std::io::Write;

use paritylab_core::{
    compare, compute_detailed, compute_trace, read_hw_log, EmaConfig, FixedPoint, FixedPointEma,
    Mismatch, ParityError, Signal, Tick, Trace,
};

fn trace(entries: &[(u64, Signal)]) -> Trace {
    entries.iter().map(|&(t, s)| (Tick(t), s)).collect()
}

fn write_log(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn comparator_inner_join() {
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
            sw: Signal::Buy,
        }]
    );
    assert_eq!(report.match_rate_display(), "50.00");
}

#[test]
fn shift_one_negative_delta_floors() {
    let mut ema = FixedPointEma::new(1);
    let avg1 = ema.update(FixedPoint::from_f64(100.0));
    let avg2 = ema.update(FixedPoint::from_f64(90.0));

    assert_eq!(avg1.raw(), 100 * 65_536);
    assert_eq!(avg2.raw() - avg1.raw(), -327_680);
    assert_ne!(avg2.raw() - avg1.raw(), -327_679);
}

#[test]
fn software_trace_against_file_log() {
    let prices: Vec<FixedPoint> = [100.0, 101.5, 99.25, 98.0, 102.75, 103.0]
        .into_iter()
        .map(FixedPoint::from_f64)
        .collect();
    let points = compute_detailed(&prices, EmaConfig::default()).unwrap();

    // Hardware log with simulator noise, a duplicate, and one flipped decision.
    let mut text = String::from("VCD info: dumpfile tick_pipeline.vcd opened for output.\n");
    for p in &points {
        let code = if p.tick == Tick(4) {
            Signal::Buy.hw_code()
        } else {
            p.signal.hw_code()
        };
        text.push_str(&format!(
            "tick {} -> signal={}  fast={} slow={}\n",
            p.tick,
            code,
            p.fast.raw(),
            p.slow.raw()
        ));
    }
    text.push_str("tick 4 -> signal=0\n");
    let file = write_log(&text);

    let hw_log = read_hw_log(file.path()).unwrap();
    assert_eq!(hw_log.len(), 6);
    assert_eq!(hw_log.duplicates, 1);
    assert_eq!(hw_log.skipped_lines, 1);

    let sw = compute_trace(&prices, EmaConfig::default()).unwrap();
    let report = compare(&hw_log.trace(), &sw).unwrap();

    assert_eq!(report.compared, 6);
    assert_eq!(report.mismatch_count(), 1);
    let first = report.first_divergence().unwrap();
    assert_eq!(first.tick, Tick(4));
    assert_eq!(first.hw, Signal::Buy);
    assert_eq!(first.sw, Signal::Sell);

    // The captured accumulators line up with the software model at the
    // divergent tick, so the decision logic is the suspect, not the EMA.
    let rec = hw_log.record(Tick(4)).unwrap();
    assert_eq!(rec.fast, Some(points[3].fast));
    assert_eq!(rec.slow, Some(points[3].slow));
}

#[test]
fn missing_log_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hw_log.txt");
    let err = read_hw_log(&path).unwrap_err();
    assert!(matches!(err, ParityError::LogNotFound { .. }));
    assert!(err.to_string().contains("hw_log.txt"));
}

#[test]
fn log_without_records_is_empty_log() {
    let file = write_log("compiling tick_pipeline.v\nsimulation finished\n");
    let err = read_hw_log(file.path()).unwrap_err();
    assert!(matches!(err, ParityError::EmptyLog { .. }));
}

#[test]
fn zero_byte_log_is_empty_log() {
    let file = write_log("");
    assert!(matches!(
        read_hw_log(file.path()),
        Err(ParityError::EmptyLog { .. })
    ));
}

#[test]
fn disjoint_traces_do_not_overlap() {
    let prices = vec![FixedPoint::from_int(100); 3];
    let sw = compute_trace(&prices, EmaConfig::default()).unwrap();
    let hw = trace(&[(10, Signal::Hold), (11, Signal::Hold)]);
    assert!(matches!(compare(&hw, &sw), Err(ParityError::NoOverlap)));
}
