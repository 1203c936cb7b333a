//! Hardware simulation log parsing.
//!
//! The simulator prints one line per tick:
//!
//! ```text
//! tick 87 -> signal=1  fast=6553600 slow=6551234
//! ```
//!
//! Only the tick number and signal code are required; the `fast=`/`slow=`
//! accumulator dumps are captured when present and used for diagnostics only.
//! Every other line in the log (banners, `$display` noise, VCD notices) is
//! skipped without complaint.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

use crate::domain::{FixedPoint, Signal, Tick, Trace};
use crate::error::ParityError;
use crate::sw_trace::TracePoint;

/// Pattern for a hardware tick record.
///
/// Capture groups, in field order:
/// - `tick`: decimal tick number.
/// - `signal`: decimal 2-bit signal code (`1` BUY, `3` SELL, else HOLD).
/// - `fast`: optional raw Q16.16 fast accumulator.
/// - `slow`: optional raw Q16.16 slow accumulator, only together with `fast`.
///
/// Matching is case-insensitive and tolerant of extra whitespace; anything
/// after the last matched field is ignored.
pub const HW_TICK_PATTERN: &str = r"(?i)tick\s+(?P<tick>\d+)\s*->\s*signal\s*=\s*(?P<signal>\d+)(?:\s+fast\s*=\s*(?P<fast>-?\d+)\s+slow\s*=\s*(?P<slow>-?\d+))?";

static HW_TICK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HW_TICK_PATTERN).expect("HW_TICK_PATTERN is a valid regex"));

/// One decoded tick record from the hardware log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwRecord {
    pub tick: Tick,
    /// Raw code as printed. Values too large for `u64` are stored as `u64::MAX`
    /// and still decode to HOLD.
    pub code: u64,
    pub signal: Signal,
    pub fast: Option<FixedPoint>,
    pub slow: Option<FixedPoint>,
    /// 1-based line number in the source text.
    pub line_no: usize,
}

/// Parsed hardware log: first record per tick, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwLog {
    records: Vec<HwRecord>,
    /// Tick records dropped because their tick was already seen.
    pub duplicates: usize,
    /// Lines that carried no tick record.
    pub skipped_lines: usize,
}

impl HwLog {
    /// Parse log lines. Never fails; see [`read_hw_log`] for the file boundary.
    pub fn parse_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut log = HwLog::default();
        let mut seen = Trace::new();

        for (i, line) in lines.into_iter().enumerate() {
            let Some(record) = parse_line(line, i + 1) else {
                log.skipped_lines += 1;
                continue;
            };
            if seen.insert_first(record.tick, record.signal) {
                log.records.push(record);
            } else {
                debug!(
                    "hw log line {}: duplicate tick {} ignored",
                    record.line_no, record.tick
                );
                log.duplicates += 1;
            }
        }

        log
    }

    pub fn from_text(text: &str) -> Self {
        Self::parse_lines(text.lines())
    }

    pub fn records(&self) -> &[HwRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, tick: Tick) -> Option<&HwRecord> {
        self.records.iter().find(|r| r.tick == tick)
    }

    pub fn trace(&self) -> Trace {
        self.records.iter().map(|r| (r.tick, r.signal)).collect()
    }
}

fn parse_line(line: &str, line_no: usize) -> Option<HwRecord> {
    let caps = HW_TICK_RE.captures(line)?;
    let tick = caps.name("tick")?.as_str().parse::<u64>().ok()?;
    let code = caps
        .name("signal")?
        .as_str()
        .parse::<u64>()
        .unwrap_or(u64::MAX);
    let fast = caps
        .name("fast")
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(FixedPoint);
    let slow = caps
        .name("slow")
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(FixedPoint);

    Some(HwRecord {
        tick: Tick(tick),
        code,
        signal: Signal::from_hw_code(code),
        fast,
        slow,
        line_no,
    })
}

/// Parse log text straight into a trace.
pub fn parse_hw_log(text: &str) -> Trace {
    HwLog::from_text(text).trace()
}

/// Read and parse a hardware log file.
///
/// Fails with [`ParityError::LogNotFound`] when the file cannot be opened and
/// [`ParityError::EmptyLog`] when it holds no tick records.
pub fn read_hw_log(path: &Path) -> Result<HwLog, ParityError> {
    let bytes = std::fs::read(path).map_err(|e| ParityError::LogNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let log = HwLog::from_text(&text);

    if log.is_empty() {
        return Err(ParityError::EmptyLog {
            path: path.to_path_buf(),
        });
    }

    debug!(
        "hw log {}: {} records, {} duplicates, {} other lines",
        path.display(),
        log.len(),
        log.duplicates,
        log.skipped_lines
    );
    Ok(log)
}

/// Render trace points in the hardware log format, one line per tick.
///
/// Useful for golden fixtures: a log rendered from the software trace must
/// compare at 100%.
pub fn render_hw_log(points: &[TracePoint]) -> String {
    let mut out = String::new();
    for p in points {
        out.push_str(&format!(
            "tick {} -> signal={}  fast={} slow={}\n",
            p.tick,
            p.signal.hw_code(),
            p.fast.raw(),
            p.slow.raw()
        ));
    }
    out
}
