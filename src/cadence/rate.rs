use std::collections::VecDeque;

use crate::config::{RateConfig, RateMethod};
use crate::constants::{MIN_SPAN_MS, MS_PER_MINUTE, MS_PER_SECOND};

/// Sliding-window event rate estimator
///
/// Holds the timestamps of recent events in chronological order and turns
/// them into an events-per-minute rate. The window is re-pruned to the
/// trailing `window_secs` on every computation, so an idle estimator decays
/// to zero on its own.
pub struct RateEstimator {
    events: VecDeque<u64>,
    window_ms: u64,
    window_secs: f32,
    method: RateMethod,
}

impl RateEstimator {
    pub fn new(window_secs: f32, method: RateMethod) -> Self {
        Self {
            events: VecDeque::new(),
            window_ms: (window_secs * MS_PER_SECOND).round() as u64,
            window_secs,
            method,
        }
    }

    pub fn from_config(config: &RateConfig) -> Self {
        Self::new(config.window_secs, config.method)
    }

    /// Append an event timestamp
    ///
    /// Returns `false` and drops the event if it is older than the newest
    /// recorded event.
    pub fn record(&mut self, timestamp_ms: u64) -> bool {
        if let Some(&newest) = self.events.back() {
            if timestamp_ms < newest {
                log::warn!(
                    "Dropping out-of-order event at {} ms (newest is {} ms)",
                    timestamp_ms,
                    newest
                );
                return false;
            }
        }
        self.events.push_back(timestamp_ms);
        true
    }

    /// Prune the window to `[now - window, now]` and compute the rate in
    /// events per minute.
    pub fn compute(&mut self, now_ms: u64) -> f32 {
        self.prune(now_ms);

        match self.method {
            RateMethod::Density => self.events.len() as f32 / self.window_secs * 60.0,
            RateMethod::Span => self.span_rate(),
        }
    }

    fn span_rate(&self) -> f32 {
        let (Some(&first), Some(&last)) = (self.events.front(), self.events.back()) else {
            return 0.0;
        };
        let span_ms = last.saturating_sub(first) as f32;
        if self.events.len() < 2 || span_ms < MIN_SPAN_MS {
            return 0.0;
        }
        (self.events.len() - 1) as f32 / (span_ms / MS_PER_MINUTE)
    }

    fn prune(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        while self.events.front().is_some_and(|&t| t < cutoff) {
            self.events.pop_front();
        }
    }

    /// Number of events currently held (as of the last prune)
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.iter().copied()
    }

    pub fn method(&self) -> RateMethod {
        self.method
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
