//! Drivers that feed a [`CadenceProcessor`] and fire its periodic tick.
//!
//! Two ways to drive the pipeline:
//! - [`replay`] walks a recorded source and uses sample timestamps as the
//!   clock, so results are reproducible.
//! - [`run_live`] multiplexes a channel of input events with a wall-clock
//!   ticker on one thread. Samples and ticks are handled strictly in arrival
//!   order and never concurrently.

use std::io::BufRead;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::cadence::HistoryBuffer;
use crate::config::TickPeriod;
use crate::error::Result;
use crate::processing::{CadenceProcessor, ResetMode, TickOutput};
use crate::sensor::{Clock, RawSample, SensorSource, parse_axes};

/// Fixed-period tick schedule anchored at the first observed time
#[derive(Debug, Clone)]
pub struct TickSchedule {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl TickSchedule {
    pub fn new(period: TickPeriod) -> Self {
        Self {
            period_ms: period.as_millis().max(1),
            next_due_ms: None,
        }
    }

    /// Return the next tick time at or before `now`, advancing the schedule.
    /// Call repeatedly to catch up on every missed tick.
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        let due = *self.next_due_ms.get_or_insert(now_ms + self.period_ms);
        if due <= now_ms {
            self.next_due_ms = Some(due + self.period_ms);
            Some(due)
        } else {
            None
        }
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }
}

/// Counters reported by a driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: usize,
    pub ticks: usize,
    pub events: usize,
}

/// Replay a recorded source through the processor
///
/// Before each sample is processed, every tick that fell due at or before
/// its timestamp is fired. `sink` receives each tick result together with
/// the updated history.
pub fn replay<S, F>(
    source: &mut S,
    processor: &mut CadenceProcessor,
    period: TickPeriod,
    mut sink: F,
) -> Result<RunSummary>
where
    S: SensorSource + ?Sized,
    F: FnMut(&TickOutput, &HistoryBuffer),
{
    let mut schedule = TickSchedule::new(period);
    let mut summary = RunSummary::default();

    while let Some(sample) = source.next_sample()? {
        while let Some(due) = schedule.poll(sample.timestamp_ms) {
            let output = processor.on_tick(due);
            sink(&output, processor.history());
            summary.ticks += 1;
        }

        summary.samples += 1;
        if processor.on_sample(&sample).is_some() {
            summary.events += 1;
        }
    }

    Ok(summary)
}

/// One unit of live input
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Sample(RawSample),
    /// Manual event at the given time
    Inject(u64),
    Reset(ResetMode),
}

/// Parse one live input line stamped at `now_ms`
///
/// Accepts `x,y,z` samples and the commands `tap`, `reset` and `reset-all`.
/// Blank lines and `#` comments yield `None`.
pub fn parse_input_line(line: &str, now_ms: u64) -> Option<InputEvent> {
    let line = line.trim();
    match line {
        "" => None,
        _ if line.starts_with('#') => None,
        "tap" => Some(InputEvent::Inject(now_ms)),
        "reset" => Some(InputEvent::Reset(ResetMode::EventsOnly)),
        "reset-all" => Some(InputEvent::Reset(ResetMode::Full)),
        _ => Some(InputEvent::Sample(parse_axes(line, now_ms))),
    }
}

/// Read input lines on a background thread, stamping each with `clock`
///
/// The thread ends at end of input, on a read error, or once the receiver
/// is gone. Dropping its sender tears the stream down for [`run_live`].
pub fn spawn_line_reader<R, C>(reader: R, clock: C, tx: Sender<InputEvent>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
    C: Clock + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Sensor input failed: {}", e);
                    break;
                }
            };
            if let Some(event) = parse_input_line(&line, clock.now_ms()) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        log::debug!("Sensor reader finished");
    })
}

/// Drive the processor from live input until the stream closes or
/// `duration` elapses
pub fn run_live<C, F>(
    rx: &Receiver<InputEvent>,
    processor: &mut CadenceProcessor,
    clock: &C,
    period: TickPeriod,
    duration: Option<Duration>,
    mut sink: F,
) -> RunSummary
where
    C: Clock + ?Sized,
    F: FnMut(&TickOutput, &HistoryBuffer),
{
    let ticker = crossbeam_channel::tick(period.as_duration());
    let deadline = duration
        .map(crossbeam_channel::after)
        .unwrap_or_else(crossbeam_channel::never);
    let mut summary = RunSummary::default();

    loop {
        crossbeam_channel::select! {
            recv(rx) -> msg => match msg {
                Ok(InputEvent::Sample(sample)) => {
                    summary.samples += 1;
                    if processor.on_sample(&sample).is_some() {
                        summary.events += 1;
                    }
                }
                Ok(InputEvent::Inject(now_ms)) => {
                    if processor.inject_event(now_ms) {
                        summary.events += 1;
                    }
                }
                Ok(InputEvent::Reset(mode)) => processor.reset(mode),
                Err(_) => {
                    log::info!("Sensor stream closed, stopping ticks");
                    break;
                }
            },
            recv(ticker) -> _ => {
                let output = processor.on_tick(clock.now_ms());
                sink(&output, processor.history());
                summary.ticks += 1;
            }
            recv(deadline) -> _ => break,
        }
    }

    summary
}
