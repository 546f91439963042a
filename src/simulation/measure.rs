use crate::config::CadenceConfig;
use crate::driver::{RunSummary, replay};
use crate::error::Result;
use crate::processing::{CadenceProcessor, TickOutput};
use crate::sensor::{RawSample, RecordingSource};

use super::{NoiseConfig, WalkProfile, apply_noise, generate_walk};

/// Every tick produced while replaying a synthetic recording
#[derive(Debug, Clone, Default)]
pub struct CadenceMeasurement {
    pub ticks: Vec<TickOutput>,
    pub summary: RunSummary,
    pub dropped_samples: u64,
}

impl CadenceMeasurement {
    /// Rate reported by the last tick at or before `timestamp_ms`
    pub fn rate_at(&self, timestamp_ms: u64) -> Option<f32> {
        self.ticks
            .iter()
            .take_while(|t| t.timestamp_ms <= timestamp_ms)
            .last()
            .and_then(|t| t.rate)
    }

    pub fn final_rate(&self) -> Option<f32> {
        self.ticks.last().and_then(|t| t.rate)
    }

    /// Largest deviation from `expected` over ticks at or after `settle_ms`
    pub fn max_error_after(&self, settle_ms: u64, expected: f32) -> Option<f32> {
        self.ticks
            .iter()
            .filter(|t| t.timestamp_ms >= settle_ms)
            .filter_map(|t| t.rate)
            .map(|r| (r - expected).abs())
            .reduce(f32::max)
    }

    pub fn labels(&self) -> Vec<String> {
        self.ticks.iter().map(|t| t.state.label().to_string()).collect()
    }
}

/// Replay samples through a fresh processor using sample time as the clock
pub fn measure_cadence(samples: &[RawSample], config: &CadenceConfig) -> Result<CadenceMeasurement> {
    let mut processor = CadenceProcessor::new(config)?;
    let mut source = RecordingSource::from_samples(samples.to_vec());
    let mut ticks = Vec::new();

    let summary = replay(&mut source, &mut processor, config.tick.period, |output, _| {
        ticks.push(output.clone());
    })?;

    Ok(CadenceMeasurement {
        ticks,
        summary,
        dropped_samples: processor.dropped_samples(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct RateErrorStats {
    pub max_error: f32,
    pub mean_error: f32,
    /// Cadences for which no tick after settling produced a rate
    pub missing: usize,
}

/// Worst-case rate error across a set of steady cadences
pub fn measure_error_across_cadences(
    noise_config: &NoiseConfig,
    config: &CadenceConfig,
    profile: &WalkProfile,
    cadences: &[f32],
    duration_secs: f32,
    settle_ms: u64,
) -> Result<RateErrorStats> {
    let mut errors = Vec::new();
    let mut missing = 0;

    for &cadence in cadences {
        let clean = generate_walk(duration_secs, cadence, profile);
        let noisy = apply_noise(&clean, noise_config, profile.sample_rate_hz);
        let measurement = measure_cadence(&noisy, config)?;

        match measurement.max_error_after(settle_ms, cadence) {
            Some(e) => errors.push(e),
            None => missing += 1,
        }
    }

    let mean_error = if errors.is_empty() {
        0.0
    } else {
        errors.iter().sum::<f32>() / errors.len() as f32
    };

    Ok(RateErrorStats {
        max_error: errors.iter().fold(0.0f32, |a, &b| a.max(b)),
        mean_error,
        missing,
    })
}
