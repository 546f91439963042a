use crate::config::PeakConfig;

/// Minimum-interval gate shared by detected and manually injected events
///
/// An event is accepted only if strictly more than `min_interval_ms` has
/// elapsed since the previously accepted one. The first event is always
/// accepted.
#[derive(Debug, Clone)]
pub struct RefractoryGate {
    min_interval_ms: u64,
    last_event_ms: Option<u64>,
}

impl RefractoryGate {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_event_ms: None,
        }
    }

    /// Accept or reject an event at `now`, recording it on acceptance
    pub fn try_accept(&mut self, now: u64) -> bool {
        let open = match self.last_event_ms {
            Some(last) => now.saturating_sub(last) > self.min_interval_ms,
            None => true,
        };
        if open {
            self.last_event_ms = Some(now);
        }
        open
    }

    pub fn last_event_ms(&self) -> Option<u64> {
        self.last_event_ms
    }

    pub fn reset(&mut self) {
        self.last_event_ms = None;
    }
}

/// Peak detector for step events in linear acceleration magnitude
///
/// Detects strict local maxima one sample after they occur: the sample
/// before last must be lower than the candidate and the current sample must
/// not exceed it. A candidate becomes an event only if it clears the
/// amplitude threshold, rises far enough above the pre-peak sample (when a
/// minimum prominence is configured), and the refractory gate is open.
pub struct PeakDetector {
    threshold: f32,
    min_prominence: Option<f32>,
    gate: RefractoryGate,
    prev: f32,
    prev2: f32,
}

impl PeakDetector {
    /// Create a new peak detector
    ///
    /// # Arguments
    /// * `threshold` - Minimum peak magnitude (m/s²)
    /// * `min_prominence` - Minimum rise into the peak; `None` disables the check
    /// * `min_interval_ms` - Refractory interval between accepted events
    pub fn new(threshold: f32, min_prominence: Option<f32>, min_interval_ms: u64) -> Self {
        Self {
            threshold,
            min_prominence,
            gate: RefractoryGate::new(min_interval_ms),
            prev: 0.0,
            prev2: 0.0,
        }
    }

    pub fn from_config(config: &PeakConfig) -> Self {
        Self::new(
            config.threshold,
            config.min_prominence,
            config.min_interval_ms,
        )
    }

    /// Feed the next magnitude sample
    ///
    /// Returns `Some(now)` if the previous sample was a qualifying peak.
    ///
    /// # Arguments
    /// * `magnitude` - Linear acceleration magnitude of the current sample
    /// * `now` - Monotonic timestamp of the current sample in milliseconds
    pub fn observe(&mut self, magnitude: f32, now: u64) -> Option<u64> {
        let candidate = self.prev;
        let is_local_max = self.prev2 < candidate && magnitude <= candidate;
        let above_threshold = candidate > self.threshold;
        let prominent = self
            .min_prominence
            .is_none_or(|min| candidate - self.prev2 > min);

        self.prev2 = self.prev;
        self.prev = magnitude;

        if is_local_max && above_threshold && prominent && self.gate.try_accept(now) {
            Some(now)
        } else {
            None
        }
    }

    /// Route an externally produced event through the refractory gate only
    pub fn inject(&mut self, now: u64) -> Option<u64> {
        self.gate.try_accept(now).then_some(now)
    }

    /// Find all events in a buffer of `(timestamp_ms, magnitude)` pairs
    pub fn find_all_peaks(&mut self, buffer: &[(u64, f32)]) -> Vec<u64> {
        buffer
            .iter()
            .filter_map(|&(now, magnitude)| self.observe(magnitude, now))
            .collect()
    }

    pub fn last_event_ms(&self) -> Option<u64> {
        self.gate.last_event_ms()
    }

    /// Reset detector state
    pub fn reset(&mut self) {
        self.gate.reset();
        self.prev = 0.0;
        self.prev2 = 0.0;
    }
}
