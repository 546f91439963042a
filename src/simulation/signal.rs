use crate::constants::STANDARD_GRAVITY;
use crate::sensor::RawSample;
use crate::signal_processing::Vector3;

/// Peak of the heel-strike impact along the gravity axis (m/s²)
pub const STEP_IMPACT_AMPLITUDE: f32 = 4.0;
/// Exponential decay time constant of each impact in milliseconds
pub const STEP_DECAY_MS: f32 = 40.0;
/// Default device tilt away from vertical
pub const DEFAULT_TILT_DEGREES: f32 = 20.0;

/// Shape of a synthetic walker
#[derive(Debug, Clone, Copy)]
pub struct WalkProfile {
    pub sample_rate_hz: f32,
    pub impact_amplitude: f32,
    pub decay_ms: f32,
    /// Device tilt; gravity is split between the x and z axes
    pub tilt_degrees: f32,
}

impl Default for WalkProfile {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50.0,
            impact_amplitude: STEP_IMPACT_AMPLITUDE,
            decay_ms: STEP_DECAY_MS,
            tilt_degrees: DEFAULT_TILT_DEGREES,
        }
    }
}

impl WalkProfile {
    fn gravity_axis(&self) -> Vector3 {
        let tilt = self.tilt_degrees.to_radians();
        Vector3::new(tilt.sin(), 0.0, tilt.cos())
    }
}

/// Generate a walker at a constant cadence (steps per minute)
pub fn generate_walk(duration_secs: f32, cadence_spm: f32, profile: &WalkProfile) -> Vec<RawSample> {
    generate_walk_with_cadence_fn(duration_secs, profile, |_| cadence_spm)
}

/// Generate a walker whose cadence varies over time
///
/// `cadence_fn` takes time in seconds and returns steps per minute. Each
/// step is a sharp impact along the gravity axis that decays exponentially.
/// A cadence of zero means standing still.
pub fn generate_walk_with_cadence_fn<F>(
    duration_secs: f32,
    profile: &WalkProfile,
    cadence_fn: F,
) -> Vec<RawSample>
where
    F: Fn(f32) -> f32,
{
    let num_samples = (duration_secs * profile.sample_rate_hz) as usize;
    let dt = 1.0 / profile.sample_rate_hz;
    let axis = profile.gravity_axis();
    let gravity = axis * STANDARD_GRAVITY;

    let mut samples = Vec::with_capacity(num_samples);
    let mut step_phase = 0.0f32;
    let mut since_impact: Option<f32> = None;

    for i in 0..num_samples {
        let t = i as f32 * dt;

        step_phase += cadence_fn(t).max(0.0) / 60.0 * dt;
        if step_phase >= 1.0 {
            step_phase -= 1.0;
            since_impact = Some(0.0);
        }

        let bounce = match since_impact.as_mut() {
            Some(elapsed) => {
                let b = profile.impact_amplitude * (-*elapsed * 1000.0 / profile.decay_ms).exp();
                *elapsed += dt;
                b
            }
            None => 0.0,
        };

        let timestamp_ms = (t * 1000.0).round() as u64;
        samples.push(RawSample::from_vector(timestamp_ms, gravity + axis * bounce));
    }

    samples
}

/// Times (ms) at which impacts start for a constant cadence
pub fn expected_step_times(duration_secs: f32, cadence_spm: f32, profile: &WalkProfile) -> Vec<u64> {
    let dt = 1.0 / profile.sample_rate_hz;
    let num_samples = (duration_secs * profile.sample_rate_hz) as usize;
    let mut phase = 0.0f32;
    let mut times = Vec::new();
    for i in 0..num_samples {
        phase += cadence_spm / 60.0 * dt;
        if phase >= 1.0 {
            phase -= 1.0;
            times.push((i as f32 * dt * 1000.0).round() as u64);
        }
    }
    times
}
