//! ParityLab CLI — generate ticks, run the software model, and check it
//! against a hardware simulation log.
//!
//! Commands:
//! - `generate` — write a deterministic synthetic ticks CSV
//! - `trace` — run the software model and export the per-tick strategy table
//! - `check` — compare the software model against a hardware log
//! - `sweep` — rank (fast_shift, slow_shift) pairs against a hardware log
//! - `snapshot` — latest period-EMA crossover state of a close series

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paritylab_core::{
    crossover_count, read_hw_log, render_hw_log, snapshot, Crossover, FixedPoint,
    MarketSnapshot, ParityError, Signal, SignalCounts, Trace,
};
use paritylab_runner::{
    export_strategy_csv, export_sweep_csv, load_closes, load_prices, run_parity, run_sweep,
    run_trace, save_artifacts, write_price_records, Divergence, ParityConfig, ParityRun,
    RunError, ShiftGrid, SweepEntry, SyntheticSpec,
};

#[derive(Parser)]
#[command(
    name = "paritylab",
    about = "ParityLab CLI — fixed-point EMA crossover HW/SW parity checker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that runs the software model.
#[derive(clap::Args)]
struct ModelArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks CSV with a `price_q16` column (overrides config).
    #[arg(long)]
    ticks: Option<PathBuf>,

    /// Fast EMA shift (overrides config).
    #[arg(long)]
    fast_shift: Option<u32>,

    /// Slow EMA shift (overrides config).
    #[arg(long)]
    slow_shift: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a deterministic synthetic ticks CSV (price, price_q16).
    Generate {
        /// Output CSV path.
        #[arg(long, default_value = "python_version/ticks.csv")]
        output: PathBuf,

        /// Number of ticks.
        #[arg(long, default_value_t = 400)]
        points: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Sine period in ticks.
        #[arg(long, default_value_t = 18.0)]
        period: f64,

        /// Sine amplitude.
        #[arg(long, default_value_t = 3.0)]
        amplitude: f64,

        /// Gaussian noise standard deviation.
        #[arg(long, default_value_t = 0.6)]
        noise: f64,
    },
    /// Run the software model and export price, fast/slow EMA and signal per tick.
    Trace {
        #[command(flatten)]
        model: ModelArgs,

        /// Strategy CSV output path.
        #[arg(long, default_value = "strategy_output.csv")]
        output: PathBuf,

        /// Also write the trace in hardware log format, for testbench diffing.
        #[arg(long)]
        hw_format: Option<PathBuf>,
    },
    /// Compare the software model against a hardware simulation log.
    Check {
        #[command(flatten)]
        model: ModelArgs,

        /// Hardware log path (overrides config).
        #[arg(long)]
        hw_log: Option<PathBuf>,

        /// Save report.json, mismatches.csv and comparison.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rank (fast_shift, slow_shift) pairs by match rate against a hardware log.
    Sweep {
        #[command(flatten)]
        model: ModelArgs,

        /// Hardware log path (overrides config).
        #[arg(long)]
        hw_log: Option<PathBuf>,

        /// Fast shifts to try (comma separated).
        #[arg(long, value_delimiter = ',', default_values_t = [0u32, 1, 2, 3, 4])]
        fast: Vec<u32>,

        /// Slow shifts to try (comma separated).
        #[arg(long, value_delimiter = ',', default_values_t = [2u32, 3, 4, 5, 6, 7, 8, 9, 10])]
        slow: Vec<u32>,

        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run sequentially instead of in parallel.
        #[arg(long, default_value_t = false)]
        serial: bool,

        /// Write all results as CSV.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Latest period-EMA crossover state of a close series.
    Snapshot {
        /// CSV with a close column.
        input: PathBuf,

        /// Name of the close column.
        #[arg(long, default_value = "close")]
        column: String,

        /// Fast EMA period.
        #[arg(long, default_value_t = 12)]
        fast: usize,

        /// Slow EMA period.
        #[arg(long, default_value_t = 26)]
        slow: usize,

        /// Print the snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if let Some(hint) = guidance(&err) {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            output,
            points,
            seed,
            period,
            amplitude,
            noise,
        } => {
            let spec = SyntheticSpec {
                num_points: points,
                period,
                amplitude,
                noise_sd: noise,
                seed,
                ..SyntheticSpec::default()
            };
            run_generate(&spec, &output)
        }
        Commands::Trace {
            model,
            output,
            hw_format,
        } => run_trace_cmd(&model, &output, hw_format.as_deref()),
        Commands::Check {
            model,
            hw_log,
            output_dir,
            json,
        } => run_check(&model, hw_log, output_dir.as_deref(), json),
        Commands::Sweep {
            model,
            hw_log,
            fast,
            slow,
            top,
            serial,
            output,
        } => run_sweep_cmd(
            &model,
            hw_log,
            ShiftGrid::new(fast, slow),
            top,
            !serial,
            output.as_deref(),
        ),
        Commands::Snapshot {
            input,
            column,
            fast,
            slow,
            json,
        } => run_snapshot(&input, &column, fast, slow, json),
    }
}

/// Next step for the operator when a run ends on one of the core conditions.
fn guidance(err: &anyhow::Error) -> Option<&'static str> {
    let parity = err
        .downcast_ref::<RunError>()
        .and_then(RunError::parity)
        .or_else(|| err.downcast_ref::<ParityError>())?;
    Some(match parity {
        ParityError::EmptyInput => {
            "The ticks file has no rows. Generate one with: paritylab generate"
        }
        ParityError::LogNotFound { .. } => {
            "Run the simulation first: vvp verilog_version/sim | tee hw_log.txt"
        }
        ParityError::EmptyLog { .. } => {
            "The log has no 'tick N -> signal=X' lines. Check that the testbench prints one per tick."
        }
        ParityError::NoOverlap => {
            "Hardware and software ticks do not overlap. Check that both were fed the same ticks file."
        }
    })
}

fn load_config(model: &ModelArgs, hw_log: Option<PathBuf>) -> Result<ParityConfig> {
    let mut config = match &model.config {
        Some(path) => ParityConfig::from_file(path).map_err(RunError::from)?,
        None => ParityConfig::default(),
    };
    if let Some(ticks) = &model.ticks {
        config.paths.ticks = ticks.clone();
    }
    if let Some(hw_log) = hw_log {
        config.paths.hw_log = hw_log;
    }
    if let Some(fast) = model.fast_shift {
        config.ema.fast_shift = fast;
    }
    if let Some(slow) = model.slow_shift {
        config.ema.slow_shift = slow;
    }
    Ok(config)
}

// ─── generate ───────────────────────────────────────────────────────

fn run_generate(spec: &SyntheticSpec, output: &Path) -> Result<()> {
    let records = spec.generate()?;
    write_price_records(output, &records)?;
    println!("Wrote {} ticks to {}", records.len(), output.display());
    Ok(())
}

// ─── trace ──────────────────────────────────────────────────────────

fn run_trace_cmd(model: &ModelArgs, output: &Path, hw_format: Option<&Path>) -> Result<()> {
    let config = load_config(model, None)?;
    let points = run_trace(&config)?;

    let csv = export_strategy_csv(&points)?;
    std::fs::write(output, csv).with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(path) = hw_format {
        std::fs::write(path, render_hw_log(&points))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Hardware-format trace written to {}", path.display());
    }

    let trace: Trace = points.iter().map(|p| (p.tick, p.signal)).collect();
    println!("Saved {} ({} ticks)", output.display(), points.len());
    print_signal_summary(&trace);
    Ok(())
}

fn print_signal_summary(trace: &Trace) {
    let counts = SignalCounts::from_trace(trace);
    println!();
    println!("--- Signal Summary ---");
    println!("BUY:        {}", counts.buy);
    println!("SELL:       {}", counts.sell);
    println!("HOLD:       {}", counts.hold);
    println!("Crossovers: {}", crossover_count(trace));
}

// ─── check ──────────────────────────────────────────────────────────

fn run_check(
    model: &ModelArgs,
    hw_log: Option<PathBuf>,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = load_config(model, hw_log)?;
    let run = run_parity(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_parity_summary(&run, &config);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&run, dir)?;
        println!();
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_parity_summary(run: &ParityRun, config: &ParityConfig) {
    let report = &run.report;
    println!();
    println!("=== Parity Check ===");
    println!(
        "EMA shifts:     fast={} slow={}",
        run.ema.fast_shift, run.ema.slow_shift
    );
    println!("Ticks compared: {}", report.compared);
    println!("Match rate:     {}%", report.match_rate_display());
    println!("Mismatches:     {}", report.mismatch_count());
    if report.hw_only > 0 || report.sw_only > 0 {
        println!(
            "Unpaired:       {} hardware-only, {} software-only",
            report.hw_only, report.sw_only
        );
    }
    if run.hw_log.duplicates > 0 {
        println!("Duplicate ticks ignored: {}", run.hw_log.duplicates);
    }
    println!("Fingerprint:    {}", run.fingerprint.short());
    println!(
        "Input hash:     {}",
        run.prices_hash.get(..12).unwrap_or(&run.prices_hash)
    );

    if !report.mismatches.is_empty() {
        let shown = config.report.mismatch_rows.min(report.mismatches.len());
        println!();
        println!("--- First {shown} mismatches ---");
        println!("{:>6} {:>5} {:>5}", "tick", "hw", "sw");
        for m in &report.mismatches[..shown] {
            println!("{:>6} {:>5} {:>5}", m.tick, m.hw, m.sw);
        }
    }

    if let Some(div) = &run.divergence {
        println!();
        print!("{}", format_divergence(div));
    }

    let sample = report.sample(config.report.sample_rows);
    if !sample.is_empty() {
        println!();
        println!("--- Sample of first {} ticks ---", sample.len());
        println!("{:>6} {:>5} {:>5} {:>6}", "tick", "hw", "sw", "match");
        for row in sample {
            println!(
                "{:>6} {:>5} {:>5} {:>6}",
                row.tick, row.hw, row.sw, row.matched
            );
        }
    }
}

/// Side-by-side model state at the first mismatch.
fn format_divergence(div: &Divergence) -> String {
    let hw = |v: Option<FixedPoint>| {
        v.map(|x| format!("{} ({:.4})", x.raw(), x.to_f64()))
            .unwrap_or_else(|| "-".to_string())
    };
    let sw = |x: FixedPoint| format!("{} ({:.4})", x.raw(), x.to_f64());

    let mut out = format!(
        "--- First divergence at tick {} (price {:.4}) ---\n",
        div.tick,
        div.price.to_f64()
    );
    out.push_str(&format!("{:<8} {:>24} {:>24}\n", "", "hardware", "software"));
    out.push_str(&format!("{:<8} {:>24} {:>24}\n", "signal", div.hw, div.sw));
    out.push_str(&format!(
        "{:<8} {:>24} {:>24}\n",
        "fast",
        hw(div.hw_fast),
        sw(div.sw_fast)
    ));
    out.push_str(&format!(
        "{:<8} {:>24} {:>24}\n",
        "slow",
        hw(div.hw_slow),
        sw(div.sw_slow)
    ));
    match div.accumulators_match() {
        Some(true) => out.push_str("Accumulators agree: suspect the decision logic.\n"),
        Some(false) => out.push_str("Accumulators differ: suspect the EMA datapath.\n"),
        None => out.push_str("No accumulator dump in the log for this tick.\n"),
    }
    out
}

// ─── sweep ──────────────────────────────────────────────────────────

fn run_sweep_cmd(
    model: &ModelArgs,
    hw_log: Option<PathBuf>,
    grid: ShiftGrid,
    top: usize,
    parallel: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(model, hw_log)?;
    let prices = load_prices(&config.paths.ticks).map_err(RunError::from)?;
    let log = read_hw_log(&config.paths.hw_log)?;
    let entries = run_sweep(&prices, &log.trace(), &grid, parallel)?;

    print_sweep(&entries, top);
    if let Some(path) = output {
        std::fs::write(path, export_sweep_csv(&entries)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Sweep results written to {}", path.display());
    }
    Ok(())
}

fn print_sweep(entries: &[SweepEntry], top: usize) {
    println!();
    println!("=== Shift Sweep ({} pairs) ===", entries.len());
    println!(
        "{:>4} {:>4} {:>9} {:>10} {:>10}",
        "fast", "slow", "match %", "mismatches", "first div"
    );
    println!("{}", "-".repeat(41));
    for e in entries.iter().take(top) {
        let first = e
            .first_divergence
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4} {:>4} {:>9.2} {:>10} {:>10}",
            e.ema.fast_shift, e.ema.slow_shift, e.match_rate, e.mismatches, first
        );
    }
}

// ─── snapshot ───────────────────────────────────────────────────────

fn run_snapshot(input: &Path, column: &str, fast: usize, slow: usize, json: bool) -> Result<()> {
    let closes = load_closes(input, column)?;
    let snap = snapshot(&closes, fast, slow)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        print_snapshot(&snap);
    }
    Ok(())
}

fn print_snapshot(snap: &MarketSnapshot) {
    println!();
    println!("=== Market Snapshot ===");
    println!("Last close:     {:.2}", snap.last_close);
    println!("Range:          {:.2} - {:.2}", snap.low, snap.high);
    let recent: Vec<String> = snap.recent.iter().map(|c| format!("{c:.2}")).collect();
    println!("Recent closes:  {}", recent.join(", "));
    println!();
    println!("EMA {:<3}         {:.4}", snap.fast_period, snap.fast_ema);
    println!("EMA {:<3}         {:.4}", snap.slow_period, snap.slow_ema);
    println!("Spread:         {:+.3}%", snap.spread_pct());
    println!();
    println!("Signal:         {}", snap.signal);
    println!("Reason:         {}", snap.reason());
    match snap.crossover {
        Some(Crossover::Bullish) => println!("Crossover:      bullish, fast just crossed above slow"),
        Some(Crossover::Bearish) => println!("Crossover:      bearish, fast just crossed below slow"),
        None if snap.signal == Signal::Hold => {}
        None => println!("Crossover:      none on the latest bar"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paritylab_core::parse_hw_log;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn check_flags_override_config() {
        let cli = Cli::try_parse_from([
            "paritylab",
            "check",
            "--ticks",
            "t.csv",
            "--hw-log",
            "sim.log",
            "--slow-shift",
            "5",
        ])
        .unwrap();
        let Commands::Check { model, hw_log, .. } = cli.command else {
            panic!("expected check");
        };
        let config = load_config(&model, hw_log).unwrap();
        assert_eq!(config.paths.ticks, PathBuf::from("t.csv"));
        assert_eq!(config.paths.hw_log, PathBuf::from("sim.log"));
        assert_eq!(config.ema.fast_shift, 1);
        assert_eq!(config.ema.slow_shift, 5);
    }

    #[test]
    fn sweep_lists_parse_comma_separated() {
        let cli = Cli::try_parse_from(["paritylab", "sweep", "--fast", "1,2", "--slow", "6"])
            .unwrap();
        let Commands::Sweep { fast, slow, .. } = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(fast, vec![1, 2]);
        assert_eq!(slow, vec![6]);
    }

    #[test]
    fn missing_log_has_simulation_hint() {
        let err = anyhow::Error::from(RunError::Parity(ParityError::LogNotFound {
            path: PathBuf::from("hw_log.txt"),
            reason: "No such file or directory".into(),
        }));
        assert!(guidance(&err).unwrap().contains("vvp verilog_version/sim"));
    }

    #[test]
    fn plain_parity_error_has_hint() {
        let err = anyhow::Error::from(ParityError::NoOverlap);
        assert!(guidance(&err).is_some());
        let other = anyhow::anyhow!("something else");
        assert!(guidance(&other).is_none());
    }

    #[test]
    fn divergence_shows_both_sides() {
        let div = Divergence {
            tick: paritylab_core::Tick(4),
            price: FixedPoint::from_int(98),
            hw: Signal::Buy,
            sw: Signal::Sell,
            hw_fast: Some(FixedPoint::from_int(99)),
            hw_slow: Some(FixedPoint(6_543_600)),
            sw_fast: FixedPoint::from_int(99),
            sw_slow: FixedPoint(6_543_600),
        };
        let text = format_divergence(&div);
        assert!(text.contains("tick 4"));
        assert!(text.contains("6488064 (99.0000)"));
        assert!(text.contains("6543600 (99.8474)"));
        assert!(text.contains("suspect the decision logic"));

        let no_dump = Divergence {
            hw_fast: None,
            hw_slow: None,
            ..div
        };
        let text = format_divergence(&no_dump);
        assert!(text.contains("No accumulator dump"));

        let drifted = Divergence {
            hw_slow: Some(FixedPoint(6_543_599)),
            ..div
        };
        assert!(format_divergence(&drifted).contains("suspect the EMA datapath"));
    }

    #[test]
    fn hw_format_parses_back() {
        let prices: Vec<_> = [100, 90, 95]
            .into_iter()
            .map(paritylab_core::FixedPoint::from_int)
            .collect();
        let points =
            paritylab_core::compute_detailed(&prices, paritylab_core::EmaConfig::default())
                .unwrap();
        assert_eq!(parse_hw_log(&render_hw_log(&points)).len(), 3);
    }
}
