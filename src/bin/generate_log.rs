use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use gyrocompass::calibration::GyroBias;
use gyrocompass::sensor::write_records;
use gyrocompass::simulation::{NoiseConfig, TurntableConfig, generate_turntable_run};

#[derive(Parser, Debug)]
#[command(name = "generate_log")]
#[command(about = "Generate synthetic turntable IMU logs for gyro bias calibration")]
struct Args {
    /// TOML configuration file ([turntable] and [noise] sections)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Headings: comma-separated (e.g., "0,120,240") or range (e.g., "0-330:30")
    #[arg(short = 'H', long, default_value = "0-330:30")]
    headings: String,

    /// Samples written per heading
    #[arg(short = 'n', long, default_value_t = 1000)]
    samples: usize,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Latitude in degrees (CLI override)
    #[arg(long)]
    latitude: Option<f64>,

    /// Gyro bias as "x,y,z" in rad/s (CLI override)
    #[arg(long)]
    bias: Option<String>,

    /// Gyro noise standard deviation in rad/s (CLI override)
    #[arg(long)]
    gyro_noise: Option<f64>,

    /// Output filename prefix
    #[arg(long, default_value = "turntable")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    #[serde(default)]
    turntable: TurntableConfig,
    #[serde(default)]
    noise: NoiseConfig,
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    file: String,
    heading: f64,
    samples: usize,
    first_tick: u64,
}

#[derive(Debug, Serialize)]
struct Manifest {
    latitude_degrees: f64,
    rotation_rate: f64,
    sample_rate_hz: f64,
    clock_frequency_hz: f64,
    bias: GyroBias,
    seed: Option<u64>,
    gyro_noise_std: f64,
    files: Vec<ManifestEntry>,
}

/// `start-end:step`, either bound may be negative (e.g. "-30-30:10").
fn parse_heading_range(range: &str, step: &str) -> Result<Vec<f64>> {
    let step: f64 = step.trim().parse().context("Invalid step value")?;
    if step.is_nan() || step <= 0.0 {
        anyhow::bail!("Range step must be positive, got {}", step);
    }

    // The first character may be the sign of `start`
    let split = range
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i)
        .context("Invalid range format. Use 'start-end:step'")?;
    let start: f64 = range[..split].trim().parse().context("Invalid start value")?;
    let end: f64 = range[split + 1..].trim().parse().context("Invalid end value")?;

    let count = ((end - start) / step + 1e-9).floor();
    if count < 0.0 {
        anyhow::bail!("Range end {} is below start {}", end, start);
    }
    Ok((0..=count as usize)
        .map(|i| start + i as f64 * step)
        .collect())
}

fn parse_headings(s: &str) -> Result<Vec<f64>> {
    match s.split_once(':') {
        Some((range, step)) => parse_heading_range(range, step),
        None => s
            .split(',')
            .map(|p| p.trim().parse::<f64>().context("Invalid heading value"))
            .collect(),
    }
}

fn parse_bias(s: &str) -> Result<GyroBias> {
    let values: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().context("Invalid bias component"))
        .collect::<Result<_>>()?;
    match values.as_slice() {
        [x, y, z] => Ok(GyroBias::new(*x, *y, *z)),
        _ => anyhow::bail!("Bias needs three components 'x,y,z'"),
    }
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let TomlConfig {
        mut turntable,
        mut noise,
    } = match args.config {
        Some(ref path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    if let Some(latitude) = args.latitude {
        turntable.latitude_degrees = latitude;
    }
    if let Some(ref bias) = args.bias {
        turntable.bias = parse_bias(bias)?;
    }
    if let Some(std) = args.gyro_noise {
        noise = noise.with_gyro_std(std);
    }
    if let Some(seed) = args.seed {
        noise = noise.with_seed(seed);
    }

    let headings = parse_headings(&args.headings)?;
    if headings.len() < 3 {
        log::warn!(
            "{} headings generated; bias calibration needs at least 3",
            headings.len()
        );
    }

    let run = generate_turntable_run(&turntable, &headings, args.samples, &noise);

    let mut manifest_entries = Vec::with_capacity(run.len());
    for (heading, samples) in headings.iter().zip(&run) {
        let filename = format!("{}_h{:03}.bin", args.prefix, heading.round() as i64);
        let filepath = args.output_dir.join(&filename);

        let mut writer = BufWriter::new(
            File::create(&filepath)
                .with_context(|| format!("Failed to create {}", filepath.display()))?,
        );
        write_records(&mut writer, samples).context("Failed to write log")?;

        manifest_entries.push(ManifestEntry {
            file: filename,
            heading: *heading,
            samples: samples.len(),
            first_tick: samples.first().map_or(0, |s| s.timestamp),
        });
        eprint!("\rGenerating: {}/{}", manifest_entries.len(), headings.len());
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            latitude_degrees: turntable.latitude_degrees,
            rotation_rate: turntable.rotation_rate,
            sample_rate_hz: turntable.sample_rate_hz,
            clock_frequency_hz: turntable.clock_frequency_hz,
            bias: turntable.bias,
            seed: noise.seed,
            gyro_noise_std: noise.gyro_std,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} logs in {}",
        headings.len(),
        args.output_dir.display()
    );
    Ok(())
}
