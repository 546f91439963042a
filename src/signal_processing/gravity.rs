use super::Vector3;
use crate::config::GravityConfig;

/// Stateful gravity remover using a per-axis single-pole low-pass filter.
///
/// The low-passed signal is the gravity estimate; subtracting it from the raw
/// reading leaves the motion-induced (linear) acceleration.
pub struct GravityFilter {
    gravity: Vector3,
    alpha: f32,
}

impl GravityFilter {
    /// Create a new gravity filter with the given smoothing factor.
    /// Alpha close to 1 (e.g., 0.8) adapts slowly and rejects step impacts.
    pub fn new(alpha: f32) -> Self {
        Self {
            gravity: Vector3::ZERO,
            alpha,
        }
    }

    pub fn from_config(config: &GravityConfig) -> Self {
        Self::new(config.alpha)
    }

    /// Create a gravity filter from a time constant and nominal sample rate.
    pub fn with_time_constant(sample_rate: f32, time_constant_secs: f32) -> Self {
        let dt = 1.0 / sample_rate;
        Self::new(time_constant_secs / (time_constant_secs + dt))
    }

    /// Fold one sample into the gravity estimate and return the linear
    /// acceleration relative to the updated estimate.
    pub fn update(&mut self, sample: Vector3) -> Vector3 {
        self.gravity = self.gravity * self.alpha + sample * (1.0 - self.alpha);
        sample - self.gravity
    }

    pub fn gravity(&self) -> Vector3 {
        self.gravity
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.gravity = Vector3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_gravity_converges() {
        let mut filter = GravityFilter::new(0.8);
        let resting = Vector3::new(0.3, -0.2, 9.8);

        let mut linear = Vector3::ZERO;
        for _ in 0..200 {
            linear = filter.update(resting);
        }

        let g = filter.gravity();
        assert!((g - resting).magnitude() < 1e-3, "gravity {:?}", g);
        assert!(linear.magnitude() < 1e-3, "linear {:?}", linear);
    }

    #[test]
    fn test_convergence_is_monotonic() {
        let mut filter = GravityFilter::new(0.8);
        let resting = Vector3::new(0.0, 0.0, 9.8);

        let mut last_error = f32::INFINITY;
        for _ in 0..50 {
            filter.update(resting);
            let error = (filter.gravity() - resting).magnitude();
            assert!(error < last_error);
            last_error = error;
        }
    }

    #[test]
    fn test_first_update_uses_post_update_gravity() {
        let mut filter = GravityFilter::new(0.8);
        let sample = Vector3::new(0.0, 0.0, 10.0);

        let linear = filter.update(sample);

        // g' = 0.2 * 10 = 2, linear = 10 - 2
        assert!((filter.gravity().z - 2.0).abs() < 1e-5);
        assert!((linear.z - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_preserves_step_oscillation() {
        let sample_rate = 50.0;
        let mut filter = GravityFilter::with_time_constant(sample_rate, 2.0);

        // 2 Hz vertical bounce on top of gravity
        let signal = |i: usize| {
            let t = i as f32 / sample_rate;
            Vector3::new(0.0, 0.0, 9.8 + 2.0 * (2.0 * PI * 2.0 * t).sin())
        };

        for i in 0..2000 {
            filter.update(signal(i));
        }

        let mut max = f32::NEG_INFINITY;
        let mut min = f32::INFINITY;
        for i in 2000..2100 {
            let z = filter.update(signal(i)).z;
            max = max.max(z);
            min = min.min(z);
        }
        let amplitude = (max - min) / 2.0;

        assert!(
            (amplitude - 2.0).abs() < 0.3,
            "oscillation amplitude should be ~2.0, got {}",
            amplitude
        );
    }

    #[test]
    fn test_reset_clears_estimate() {
        let mut filter = GravityFilter::new(0.5);
        filter.update(Vector3::new(1.0, 1.0, 1.0));
        filter.reset();
        assert_eq!(filter.gravity(), Vector3::ZERO);
    }
}
