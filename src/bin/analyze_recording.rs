use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use stepcadence::config::{CadenceConfig, RateMethod, TickPeriod};
use stepcadence::driver;
use stepcadence::output::{self, Formatter};
use stepcadence::processing::CadenceProcessor;
use stepcadence::sensor::RecordingSource;

#[derive(Parser, Debug)]
#[command(name = "analyze_recording")]
#[command(about = "Analyze accelerometer recordings for cadence statistics", long_about = None)]
struct Args {
    /// Recordings to analyze (`t_ms,x,y,z` CSV)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Rate method: span, density
    #[arg(short = 'm', long, value_enum)]
    method: Option<RateMethod>,

    /// Tick period (e.g., "500ms", "2hz")
    #[arg(short = 't', long)]
    tick: Option<TickPeriod>,

    /// Ignore ticks in the first N seconds (defaults to the rate window)
    #[arg(long)]
    settle: Option<f32>,

    /// Print every tick to stderr while analyzing
    #[arg(long)]
    ticks: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
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
struct StateShare {
    label: String,
    ticks: usize,
    fraction: f32,
}

#[derive(Debug, Clone, Serialize, Default)]
struct FileAnalysis {
    filename: String,
    duration_secs: f32,
    samples: usize,
    dropped_samples: u64,
    events: usize,
    ticks: usize,
    rate: Option<StatsSummary>,
    states: Vec<StateShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => CadenceConfig::load(path)?,
        None => CadenceConfig::default(),
    };
    if let Some(method) = args.method {
        config.rate.method = method;
    }
    if let Some(tick) = args.tick {
        config.tick.period = tick;
    }
    config.validate()?;

    let settle_ms = (args.settle.unwrap_or(config.rate.window_secs).max(0.0) * 1000.0) as u64;
    let tick_formatter = args
        .ticks
        .then(|| output::create_formatter(output::OutputFormat::Text, true));

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| analyze_file(path, &config, settle_ms, tick_formatter.as_deref()))
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results, &config),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    config: &CadenceConfig,
    settle_ms: u64,
    tick_formatter: Option<&dyn Formatter>,
) -> FileAnalysis {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    match analyze_file_impl(path, config, settle_ms, tick_formatter) {
        Ok(analysis) => FileAnalysis {
            filename,
            ..analysis
        },
        Err(e) => FileAnalysis {
            filename,
            error: Some(e.to_string()),
            ..FileAnalysis::default()
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    config: &CadenceConfig,
    settle_ms: u64,
    tick_formatter: Option<&dyn Formatter>,
) -> anyhow::Result<FileAnalysis> {
    let mut source = RecordingSource::open(path)?;
    let duration_secs = source.duration_ms() as f32 / 1000.0;
    let mut processor = CadenceProcessor::new(config)?;

    let labels: Vec<String> = processor
        .classifier()
        .bands()
        .iter()
        .map(|b| b.label.clone())
        .collect();
    let mut state_counts = vec![0usize; labels.len()];
    let mut rate_stats: Stats<f32> = Stats::new();
    let mut first_tick_ms: Option<u64> = None;

    let summary = driver::replay(
        &mut source,
        &mut processor,
        config.tick.period,
        |tick, history| {
            if let Some(f) = tick_formatter {
                eprintln!("{:>8} {}", tick.timestamp_ms, f.format(tick, history));
            }

            let start = *first_tick_ms.get_or_insert(tick.timestamp_ms);
            if tick.timestamp_ms < start + settle_ms {
                return;
            }
            if let Some(rate) = tick.rate {
                rate_stats.update(rate);
            }
            if let stepcadence::ActivityState::Classified(ref band) = tick.state {
                state_counts[band.index] += 1;
            }
        },
    )?;

    let classified: usize = state_counts.iter().sum();
    let states = labels
        .into_iter()
        .zip(state_counts)
        .map(|(label, ticks)| StateShare {
            label,
            ticks,
            fraction: if classified > 0 {
                ticks as f32 / classified as f32
            } else {
                0.0
            },
        })
        .collect();

    Ok(FileAnalysis {
        filename: String::new(),
        duration_secs,
        samples: summary.samples,
        dropped_samples: processor.dropped_samples(),
        events: summary.events,
        ticks: summary.ticks,
        rate: StatsSummary::from_stats(&rate_stats),
        states,
        error: None,
    })
}

fn dominant_state(result: &FileAnalysis) -> Option<&StateShare> {
    result
        .states
        .iter()
        .filter(|s| s.ticks > 0)
        .max_by_key(|s| s.ticks)
}

fn print_text(results: &[FileAnalysis], config: &CadenceConfig) {
    eprintln!(
        "Rate: {:?} over {} s, tick {}",
        config.rate.method, config.rate.window_secs, config.tick.period
    );
    eprintln!();

    println!(
        "{:<40} {:>8} {:>8} {:>8} {:>8} {:>8} {:>12}",
        "File", "Cadence", "Std", "Events", "Samples", "Dropped", "State"
    );
    println!("{}", "-".repeat(98));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        let mean = result
            .rate
            .as_ref()
            .map(|s| format!("{:.1}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let std = result
            .rate
            .as_ref()
            .map(|s| format!("{:.1}", s.std_dev))
            .unwrap_or_else(|| "-".to_string());
        let state = dominant_state(result).map_or("-", |s| s.label.as_str());

        println!(
            "{:<40} {:>8} {:>8} {:>8} {:>8} {:>8} {:>12}",
            result.filename, mean, std, result.events, result.samples, result.dropped_samples, state
        );
    }

    for result in results {
        if result.error.is_some() {
            continue;
        }

        if let Some(ref rate) = result.rate {
            eprintln!();
            eprintln!("Cadence statistics for {}:", result.filename);
            eprintln!("  Duration: {:.1} s ({} ticks)", result.duration_secs, result.ticks);
            eprintln!("  Mean: {:.1} spm", rate.mean);
            eprintln!("  Std dev: {:.1} spm", rate.std_dev);
            eprintln!("  Min: {:.1} spm", rate.min);
            eprintln!("  Max: {:.1} spm", rate.max);
            for share in result.states.iter().filter(|s| s.ticks > 0) {
                eprintln!("  {}: {:.1}%", share.label, 100.0 * share.fraction);
            }
        }
    }
}

fn print_csv(results: &[FileAnalysis]) {
    println!("filename,duration_secs,rate_mean,rate_std,rate_min,rate_max,events,samples,dropped_samples,state,error");
    for result in results {
        let stat = |f: fn(&StatsSummary) -> f32| {
            result
                .rate
                .as_ref()
                .map(|s| format!("{:.2}", f(s)))
                .unwrap_or_default()
        };
        let state = dominant_state(result).map_or("", |s| s.label.as_str());
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{:.2},{},{},{},{},{},{},{},{},{}",
            result.filename,
            result.duration_secs,
            stat(|s| s.mean),
            stat(|s| s.std_dev),
            stat(|s| s.min),
            stat(|s| s.max),
            result.events,
            result.samples,
            result.dropped_samples,
            state,
            error
        );
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}
