use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use gyrocompass::calibration::GyroBias;
use gyrocompass::config::{ClockFrequency, ImuConfig, IntegrationMethod};
use gyrocompass::output::{OutputFormat, create_formatter};
use gyrocompass::processing::AttitudeProcessor;
use gyrocompass::sensor::LogFileSource;

#[derive(Parser, Debug)]
#[command(name = "gyrocompass")]
#[command(about = "Integrate IMU attitude and gyrocompass heading from a binary sample log", long_about = None)]
struct Args {
    /// Binary IMU log (32-byte records)
    log: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gyro bias file written by calibrate_gyro
    #[arg(short, long)]
    bias: Option<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Samples averaged per output record
    #[arg(short, long)]
    window: Option<usize>,

    /// Timestamp clock frequency (e.g., "19200000", "19.2MHz")
    #[arg(long)]
    clock: Option<ClockFrequency>,

    /// Integration method: first-order, axis-angle
    #[arg(short, long, value_enum)]
    method: Option<IntegrationMethod>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
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

    let mut config = match args.config {
        Some(ref path) => ImuConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImuConfig::default(),
    };
    if let Some(window) = args.window {
        config.averaging.window = window;
    }
    if let Some(clock) = args.clock {
        config.clock.frequency_hz = clock.as_hz();
    }
    if let Some(method) = args.method {
        config.integration.method = method;
    }

    let bias = match args.bias {
        Some(ref path) => GyroBias::load(path)
            .with_context(|| format!("Failed to load bias {}", path.display()))?,
        None => {
            log::warn!("No bias file given; using raw gyro readings");
            GyroBias::default()
        }
    };
    log::info!(
        "Bias: x={:.6e} y={:.6e} z={:.6e} rad/s",
        bias.x,
        bias.y,
        bias.z
    );

    let mut processor = AttitudeProcessor::new(&config, bias)?;
    let mut source = LogFileSource::open(&args.log)
        .with_context(|| format!("Failed to open {}", args.log.display()))?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let count = processor.process_source(&mut source, |record| {
        println!("{}", formatter.format(record));
    })?;

    let final_attitude = processor.attitude().to_euler();
    log::info!(
        "{} records from {} raw samples; final attitude {}",
        count,
        source.records_read(),
        final_attitude
    );

    Ok(())
}
