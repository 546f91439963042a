use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use stepcadence::sensor::write_recording;
use stepcadence::simulation::{
    AdditiveNoiseConfig, DropoutConfig, ImpulseNoiseConfig, JitterConfig, NoiseConfig,
    WalkProfile, apply_noise, generate_walk,
};

#[derive(Parser, Debug)]
#[command(name = "generate_recording")]
#[command(about = "Generate synthetic accelerometer recordings with configurable noise")]
struct Args {
    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Cadences in steps per minute: comma-separated (e.g., "60,100,150") or range (e.g., "60-180:20")
    #[arg(short = 'r', long, default_value = "60-180:20")]
    cadences: String,

    /// Number of trials per cadence
    #[arg(short, long, default_value_t = 3)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = 30.0)]
    duration: f32,

    /// Sensor sample rate in Hz
    #[arg(long, default_value_t = 50.0)]
    sample_rate: f32,

    /// Output filename prefix
    #[arg(long, default_value = "walk")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// Gaussian noise standard deviation in m/s² (CLI override)
    #[arg(long)]
    noise: Option<f32>,

    /// Axis dropout probability per sample (CLI override)
    #[arg(long)]
    dropout: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    gaussian: Option<GaussianSection>,
    dropout: Option<DropoutSection>,
    impulse: Option<ImpulseSection>,
    jitter: Option<JitterSection>,
}

#[derive(Debug, Deserialize)]
struct GaussianSection {
    std_dev: f32,
}

#[derive(Debug, Deserialize)]
struct DropoutSection {
    probability: f32,
}

#[derive(Debug, Deserialize)]
struct ImpulseSection {
    rate_hz: f32,
    amplitude: f32,
}

#[derive(Debug, Deserialize)]
struct JitterSection {
    max_ms: u64,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    cadence_spm: f32,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: f32,
    duration: f32,
    files: Vec<ManifestEntry>,
}

fn parse_cadences(s: &str) -> Result<Vec<f32>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f32 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Range step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f32 = range_parts[0].parse().context("Invalid start value")?;
        let end: f32 = range_parts[1].parse().context("Invalid end value")?;

        let mut cadences = Vec::new();
        let mut c = start;
        while c <= end {
            cadences.push(c);
            c += step;
        }
        Ok(cadences)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f32>().context("Invalid cadence value"))
            .collect()
    }
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(toml: &TomlConfig, args: &Args, seed: u64) -> NoiseConfig {
    let mut config = NoiseConfig::default().with_seed(seed);

    if let Some(std_dev) = args.noise {
        config.additive = Some(AdditiveNoiseConfig { std_dev });
    } else if let Some(ref gaussian) = toml.gaussian {
        config.additive = Some(AdditiveNoiseConfig {
            std_dev: gaussian.std_dev,
        });
    }

    if let Some(probability) = args.dropout {
        config.dropout = Some(DropoutConfig { probability });
    } else if let Some(ref dropout) = toml.dropout {
        config.dropout = Some(DropoutConfig {
            probability: dropout.probability,
        });
    }

    if let Some(ref impulse) = toml.impulse {
        config.impulse = Some(ImpulseNoiseConfig {
            rate_hz: impulse.rate_hz,
            amplitude: impulse.amplitude,
        });
    }

    if let Some(ref jitter) = toml.jitter {
        config.jitter = Some(JitterConfig {
            max_ms: jitter.max_ms,
        });
    }

    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let cadences = parse_cadences(&args.cadences)?;
    let base_seed = args.seed.unwrap_or(0);
    let profile = WalkProfile {
        sample_rate_hz: args.sample_rate,
        ..WalkProfile::default()
    };

    let mut manifest_entries = Vec::new();
    let total_files = cadences.len() * args.trials as usize;
    let mut file_count = 0;

    for &cadence in &cadences {
        let clean = generate_walk(args.duration, cadence, &profile);

        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + cadence as u64;
            let noise_config = build_noise_config(&toml_config, &args, seed);
            let samples = apply_noise(&clean, &noise_config, profile.sample_rate_hz);

            let filename = format!("{}_c{:03}_t{:02}.csv", args.prefix, cadence as i32, trial);
            let filepath = args.output_dir.join(&filename);

            write_recording(&filepath, &samples)
                .with_context(|| format!("Failed to write {}", filepath.display()))?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                cadence_spm: cadence,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            duration: args.duration,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
