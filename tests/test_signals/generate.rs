use stepcadence::sensor::RawSample;

pub const STANDARD_GRAVITY_Z: f32 = 9.8;

/// Device lying flat and motionless
pub fn standing_still(duration_secs: f32, sample_rate_hz: f32) -> Vec<RawSample> {
    impulse_train(duration_secs, sample_rate_hz, &[], 0.0)
}

/// Gravity on the z axis plus a single-sample spike of `amplitude` at each
/// time in `spike_times_ms` (rounded down to the sample grid)
///
/// The detector reports each spike at the timestamp of the following
/// sample, once the peak is confirmed.
pub fn impulse_train(
    duration_secs: f32,
    sample_rate_hz: f32,
    spike_times_ms: &[u64],
    amplitude: f32,
) -> Vec<RawSample> {
    let num_samples = (duration_secs * sample_rate_hz) as usize;
    let period_ms = (1000.0 / sample_rate_hz) as u64;

    (0..num_samples)
        .map(|i| {
            let t = i as u64 * period_ms;
            let spike = if spike_times_ms.iter().any(|&s| s / period_ms * period_ms == t) {
                amplitude
            } else {
                0.0
            };
            RawSample::new(t, 0.0, 0.0, STANDARD_GRAVITY_Z + spike)
        })
        .collect()
}

/// Times from `start_ms` (inclusive) to `end_ms` (exclusive) every `interval_ms`
pub fn periodic_times(start_ms: u64, end_ms: u64, interval_ms: u64) -> Vec<u64> {
    (start_ms..end_ms).step_by(interval_ms as usize).collect()
}
