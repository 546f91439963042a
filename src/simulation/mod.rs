mod measure;
mod noise;
mod signal;

pub use measure::{
    CadenceMeasurement, RateErrorStats, measure_cadence, measure_error_across_cadences,
};
pub use noise::{
    AdditiveNoiseConfig, DropoutConfig, ImpulseNoiseConfig, JitterConfig, NoiseConfig,
    apply_noise, generate_noisy_walk,
};
pub use signal::{
    DEFAULT_TILT_DEGREES, STEP_DECAY_MS, STEP_IMPACT_AMPLITUDE, WalkProfile, expected_step_times,
    generate_walk, generate_walk_with_cadence_fn,
};
