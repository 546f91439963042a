use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;

use stepcadence::cadence::HistoryBuffer;
use stepcadence::config::{CadenceConfig, RateMethod, TickPeriod};
use stepcadence::driver::{self, InputEvent};
use stepcadence::output::{Formatter, OutputFormat, create_formatter};
use stepcadence::processing::{CadenceProcessor, TickOutput};
use stepcadence::sensor::{MonotonicClock, RecordingSource};
use stepcadence::{CadenceError, Result};

#[derive(Parser, Debug)]
#[command(name = "stepcadence")]
#[command(about = "Estimate step cadence from accelerometer samples", long_about = None)]
struct Args {
    /// Live input: `x,y,z` lines plus `tap`, `reset`, `reset-all` commands ("-" for stdin)
    #[arg(short = 'i', long, default_value = "-")]
    input: String,

    /// Replay a `t_ms,x,y,z` recording using its timestamps instead of live input
    #[arg(short = 'r', long, conflicts_with = "input")]
    replay: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Tick period (e.g., "500ms", "0.5s", "2hz")
    #[arg(short = 't', long)]
    tick: Option<TickPeriod>,

    /// Rate method: span, density
    #[arg(short = 'm', long, value_enum)]
    method: Option<RateMethod>,

    /// Rate window in seconds
    #[arg(short = 'w', long)]
    window: Option<f32>,

    /// Stop after this many seconds (live input only)
    #[arg(short = 'd', long)]
    duration: Option<f32>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
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
    if let Some(tick) = args.tick {
        config.tick.period = tick;
    }
    if let Some(method) = args.method {
        config.rate.method = method;
    }
    if let Some(window) = args.window {
        config.rate.window_secs = window;
    }

    let mut processor = CadenceProcessor::new(&config)?;
    log::info!(
        "Tick every {}, {:?} rate over {} s, {} classifier bands",
        config.tick.period,
        config.rate.method,
        config.rate.window_secs,
        processor.classifier().bands().len()
    );

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    let sink = |output: &TickOutput, history: &HistoryBuffer| {
        println!("{}", formatter.format(output, history));
    };

    let summary = match args.replay {
        Some(ref path) => {
            let mut source = RecordingSource::open(path)?;
            driver::replay(&mut source, &mut processor, config.tick.period, sink)?
        }
        None => {
            let clock = MonotonicClock::new();
            let (tx, rx) = bounded::<InputEvent>(1024);

            // Holding the sender keeps ticks running (reporting zero) when
            // the sensor cannot be opened.
            let _idle_sender = match open_input(&args.input) {
                Ok(reader) => {
                    driver::spawn_line_reader(reader, clock, tx);
                    None
                }
                Err(e) => {
                    log::error!("{}", e);
                    Some(tx)
                }
            };

            let duration = args.duration.map(Duration::from_secs_f32);
            driver::run_live(
                &rx,
                &mut processor,
                &clock,
                config.tick.period,
                duration,
                sink,
            )
        }
    };

    log::info!(
        "Processed {} samples ({} dropped), {} events, {} ticks",
        summary.samples,
        processor.dropped_samples(),
        summary.events,
        summary.ticks
    );

    Ok(())
}

fn open_input(input: &str) -> Result<Box<dyn BufRead + Send>> {
    if input == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(Path::new(input))
        .map_err(|e| CadenceError::SensorUnavailable(format!("{}: {}", input, e)))?;
    Ok(Box::new(BufReader::new(file)))
}
