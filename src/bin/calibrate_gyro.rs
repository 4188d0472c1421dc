use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use gyrocompass::ImuConfig;
use gyrocompass::calibration::{GyroBias, GyroBiasEstimator, SampleAccumulator};
use gyrocompass::config::ClockFrequency;
use gyrocompass::constants::{EARTH_ROTATION_RATE, MAX_AVERAGE_COUNT};
use gyrocompass::sensor::{AveragedSample, LogFileSource, RawSample, SampleSource};

#[derive(Parser, Debug)]
#[command(name = "calibrate_gyro")]
#[command(about = "Estimate gyro bias from logs recorded at different turntable headings", long_about = None)]
struct Args {
    /// One binary IMU log per heading
    #[arg(required = true, num_args = 3..)]
    files: Vec<PathBuf>,

    /// TOML configuration file ([clock] and [calibration] sections apply)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Samples averaged from each log
    #[arg(short = 'n', long, default_value_t = MAX_AVERAGE_COUNT)]
    count: usize,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Write the bias as TOML to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Timestamp clock frequency (e.g., "19200000", "19.2MHz"; CLI override)
    #[arg(long)]
    clock: Option<ClockFrequency>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileSummary {
    filename: String,
    duration_secs: f64,
    temperature: f64,
    gx: Option<StatsSummary>,
    gy: Option<StatsSummary>,
    gz: Option<StatsSummary>,
}

#[derive(Debug, Clone, Serialize)]
struct CalibrationReport {
    files: Vec<FileSummary>,
    bias: GyroBias,
    radius: f64,
    implied_latitude_deg: Option<f64>,
}

/// Passes samples through while collecting per-axis statistics.
struct StatsSource<S> {
    inner: S,
    first: Option<u64>,
    last: Option<u64>,
    gx: Stats<f64>,
    gy: Stats<f64>,
    gz: Stats<f64>,
}

impl<S: SampleSource> StatsSource<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            first: None,
            last: None,
            gx: Stats::new(),
            gy: Stats::new(),
            gz: Stats::new(),
        }
    }

    fn observe(&mut self, sample: &RawSample) {
        self.first.get_or_insert(sample.timestamp);
        self.last = Some(sample.timestamp);
        self.gx.update(sample.gyro.x);
        self.gy.update(sample.gyro.y);
        self.gz.update(sample.gyro.z);
    }
}

impl<S: SampleSource> SampleSource for StatsSource<S> {
    fn next_sample(&mut self) -> gyrocompass::Result<Option<RawSample>> {
        let sample = self.inner.next_sample()?;
        if let Some(ref s) = sample {
            self.observe(s);
        }
        Ok(sample)
    }
}

fn average_file(
    path: &PathBuf,
    accumulator: &SampleAccumulator,
    clock: ClockFrequency,
) -> Result<(AveragedSample, FileSummary)> {
    let source = LogFileSource::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut source = StatsSource::new(source);
    let averaged = accumulator
        .average(&mut source)
        .with_context(|| format!("Failed to average {}", path.display()))?;

    let duration_secs = match (source.first, source.last) {
        (Some(first), Some(last)) => clock.elapsed_secs(first, last),
        _ => 0.0,
    };
    let summary = FileSummary {
        filename: path.display().to_string(),
        duration_secs,
        temperature: averaged.temperature,
        gx: StatsSummary::from_stats(&source.gx),
        gy: StatsSummary::from_stats(&source.gy),
        gz: StatsSummary::from_stats(&source.gz),
    };
    Ok((averaged, summary))
}

fn load_config(path: Option<&Path>, clock: Option<ClockFrequency>) -> Result<ImuConfig> {
    let mut config = match path {
        Some(path) => ImuConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImuConfig::default(),
    };
    if let Some(clock) = clock {
        config.clock.frequency_hz = clock.as_hz();
    }
    Ok(config)
}

/// Latitude whose horizontal Earth rate matches the fitted radius.
fn implied_latitude(radius: f64) -> Option<f64> {
    let ratio = radius / EARTH_ROTATION_RATE;
    (ratio.is_finite() && (0.0..=1.0).contains(&ratio)).then(|| ratio.acos().to_degrees())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = load_config(args.config.as_deref(), args.clock)?;
    let clock = config.clock.frequency()?;
    let accumulator = SampleAccumulator::new(args.count)?;
    let estimator = GyroBiasEstimator::new(&config.calibration);
    if args.files.len() < estimator.min_points() {
        anyhow::bail!(
            "{} logs given; calibration needs at least {}",
            args.files.len(),
            estimator.min_points()
        );
    }

    let mut averaged = Vec::with_capacity(args.files.len());
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let (sample, summary) = average_file(path, &accumulator, clock)?;
        log::info!(
            "{}: gx={:.6e} gy={:.6e} gz={:.6e}",
            summary.filename,
            sample.gyro.x,
            sample.gyro.y,
            sample.gyro.z
        );
        averaged.push(sample);
        files.push(summary);
    }

    let fit = estimator.estimate(&averaged).context("Bias fit failed")?;
    let bias = fit.bias;

    let report = CalibrationReport {
        files,
        bias,
        radius: fit.radius(),
        implied_latitude_deg: implied_latitude(fit.radius()),
    };

    match args.format {
        ReportFormat::Text => print_text(&report),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    if let Some(ref output) = args.output {
        fs::write(output, bias.to_toml_string()?)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        eprintln!("Bias written to: {}", output.display());
    }

    Ok(())
}

fn print_text(report: &CalibrationReport) {
    for file in &report.files {
        println!(
            "{} ({:.1}s, {:.1}°C)",
            file.filename, file.duration_secs, file.temperature
        );
        for (axis, stats) in [("gx", &file.gx), ("gy", &file.gy), ("gz", &file.gz)] {
            if let Some(s) = stats {
                println!(
                    "  {}: mean {:+.6e} std {:.3e} [{:+.6e}, {:+.6e}] n={}",
                    axis, s.mean, s.std_dev, s.min, s.max, s.count
                );
            }
        }
    }
    println!();
    println!(
        "Bias: x={:+.6e} y={:+.6e} z={:+.6e} rad/s",
        report.bias.x, report.bias.y, report.bias.z
    );
    println!("Horizontal rate: {:.6e} rad/s", report.radius);
    match report.implied_latitude_deg {
        Some(lat) => println!("Implied latitude: {:.2}°", lat),
        None => println!("Implied latitude: n/a"),
    }
}
