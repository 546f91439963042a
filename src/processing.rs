use std::fmt;

use crate::cadence::{Band, HistoryBuffer, RateEstimator, StateClassifier};
use crate::config::CadenceConfig;
use crate::error::Result;
use crate::sensor::RawSample;
use crate::signal_processing::{GravityFilter, PeakDetector, Vector3};

/// What a reset clears besides the event window and history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResetMode {
    /// Keep the gravity estimate and detector state (orientation tracking survives)
    #[default]
    EventsOnly,
    /// Also zero the gravity estimate and the peak detector
    Full,
}

/// Activity state reported to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityState {
    /// No rate has been computed yet, or a reset happened since the last one
    Uninitialized,
    Classified(Band),
}

impl ActivityState {
    pub fn label(&self) -> &str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Classified(band) => &band.label,
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Classified(_))
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Result of one periodic tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub timestamp_ms: u64,
    /// Events per minute; `None` when uninitialized
    pub rate: Option<f32>,
    pub state: ActivityState,
    /// Events in the rate window after pruning
    pub window_events: usize,
}

impl TickOutput {
    fn uninitialized(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            rate: None,
            state: ActivityState::Uninitialized,
            window_events: 0,
        }
    }
}

/// Single-owner cadence pipeline
///
/// Samples go in through [`on_sample`](Self::on_sample); a driver calls
/// [`on_tick`](Self::on_tick) on a fixed period to get the current rate and
/// state. The processor schedules nothing itself.
pub struct CadenceProcessor {
    gravity: GravityFilter,
    peak_detector: PeakDetector,
    rate: RateEstimator,
    classifier: StateClassifier,
    history: HistoryBuffer,
    last_output: Option<TickOutput>,
    pending_reset: bool,
    last_magnitude: f32,
    accepted_samples: u64,
    dropped_samples: u64,
    total_events: u64,
}

impl CadenceProcessor {
    pub fn new(config: &CadenceConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            gravity: GravityFilter::from_config(&config.gravity),
            peak_detector: PeakDetector::from_config(&config.peak),
            rate: RateEstimator::from_config(&config.rate),
            classifier: StateClassifier::new(&config.classifier)?,
            history: HistoryBuffer::new(config.history.capacity),
            last_output: None,
            pending_reset: false,
            last_magnitude: 0.0,
            accepted_samples: 0,
            dropped_samples: 0,
            total_events: 0,
        })
    }

    /// Process one sensor sample
    ///
    /// Returns the event timestamp if this sample completed a detected step.
    /// Malformed samples are dropped without touching any state.
    pub fn on_sample(&mut self, sample: &RawSample) -> Option<u64> {
        let Some(acceleration) = sample.acceleration() else {
            self.dropped_samples += 1;
            log::trace!("Dropping incomplete sample at {} ms", sample.timestamp_ms);
            return None;
        };
        self.accepted_samples += 1;

        let linear = self.gravity.update(acceleration);
        let magnitude = linear.magnitude();
        self.last_magnitude = magnitude;

        let event = self.peak_detector.observe(magnitude, sample.timestamp_ms)?;
        self.record(event, "step")
    }

    /// Process a batch of samples, returning detected event timestamps
    pub fn process_samples(&mut self, samples: &[RawSample]) -> Vec<u64> {
        samples
            .iter()
            .filter_map(|sample| self.on_sample(sample))
            .collect()
    }

    /// Manually inject an event, subject to the refractory interval
    ///
    /// Returns `true` if the event was accepted.
    pub fn inject_event(&mut self, now_ms: u64) -> bool {
        match self.peak_detector.inject(now_ms) {
            Some(event) => self.record(event, "injected").is_some(),
            None => {
                log::debug!("Injected event at {} ms rejected by refractory gate", now_ms);
                false
            }
        }
    }

    fn record(&mut self, event_ms: u64, origin: &str) -> Option<u64> {
        if !self.rate.record(event_ms) {
            return None;
        }
        self.total_events += 1;
        log::debug!("{} event at {} ms", origin, event_ms);
        Some(event_ms)
    }

    /// Compute the rate and state for this tick and append it to the history
    pub fn on_tick(&mut self, now_ms: u64) -> TickOutput {
        let output = if self.pending_reset {
            self.pending_reset = false;
            TickOutput::uninitialized(now_ms)
        } else {
            let rate = self.rate.compute(now_ms);
            let band = self.classifier.classify(rate).clone();
            TickOutput {
                timestamp_ms: now_ms,
                rate: Some(rate),
                state: ActivityState::Classified(band),
                window_events: self.rate.len(),
            }
        };

        self.history.push(output.rate);
        self.last_output = Some(output.clone());
        output
    }

    /// Clear the event window and history; the next tick reports uninitialized
    pub fn reset(&mut self, mode: ResetMode) {
        self.rate.clear();
        self.history.reset();
        self.last_output = None;
        self.pending_reset = true;

        if mode == ResetMode::Full {
            self.gravity.reset();
            self.peak_detector.reset();
            self.last_magnitude = 0.0;
        }
        log::debug!("Reset ({:?})", mode);
    }

    /// Latest tick result, or uninitialized if no tick has run since
    /// construction or the last reset
    pub fn current(&self) -> (Option<f32>, ActivityState) {
        match &self.last_output {
            Some(output) => (output.rate, output.state.clone()),
            None => (None, ActivityState::Uninitialized),
        }
    }

    pub fn last_output(&self) -> Option<&TickOutput> {
        self.last_output.as_ref()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn classifier(&self) -> &StateClassifier {
        &self.classifier
    }

    pub fn gravity(&self) -> Vector3 {
        self.gravity.gravity()
    }

    pub fn last_magnitude(&self) -> f32 {
        self.last_magnitude
    }

    /// Events currently held in the rate window (as of the last tick)
    pub fn window_events(&self) -> usize {
        self.rate.len()
    }

    pub fn accepted_samples(&self) -> u64 {
        self.accepted_samples
    }

    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples
    }

    /// Events recorded since construction, including injected ones
    pub fn total_events(&self) -> u64 {
        self.total_events
    }
}
