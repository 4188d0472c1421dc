use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use gyrocompass::config::ClockFrequency;
use gyrocompass::sensor::{LogFileSource, SampleSource};

#[derive(Parser, Debug)]
#[command(name = "imu_dump")]
#[command(about = "Print the records of a binary IMU log as CSV", long_about = None)]
struct Args {
    /// Binary IMU log (32-byte records)
    log: PathBuf,

    /// Timestamp clock frequency (e.g., "19200000", "19.2MHz")
    #[arg(long, default_value = "19.2MHz")]
    clock: ClockFrequency,

    /// Print raw clock ticks instead of seconds
    #[arg(long)]
    ticks: bool,

    /// Stop after this many records
    #[arg(short = 'n', long)]
    limit: Option<usize>,

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

    let mut source = LogFileSource::open(&args.log)
        .with_context(|| format!("Failed to open {}", args.log.display()))?;

    println!("time,temp,gx,gy,gz,ax,ay,az");
    let limit = args.limit.unwrap_or(usize::MAX);
    let mut printed = 0;
    while printed < limit {
        let Some(sample) = source.next_sample()? else {
            break;
        };
        let time = if args.ticks {
            sample.timestamp.to_string()
        } else {
            format!("{:.6}", args.clock.ticks_to_secs(sample.timestamp))
        };
        println!(
            "{},{:.2},{:.6},{:.6},{:.6},{:.4},{:.4},{:.4}",
            time,
            sample.temperature,
            sample.gyro.x,
            sample.gyro.y,
            sample.gyro.z,
            sample.accel.x,
            sample.accel.y,
            sample.accel.z
        );
        printed += 1;
    }

    log::info!("{} records printed", printed);
    Ok(())
}
