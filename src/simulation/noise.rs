use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::sensor::RawSample;

#[derive(Clone, Debug, Default)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub dropout: Option<DropoutConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
    pub jitter: Option<JitterConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gaussian(mut self, std_dev: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { std_dev });
        self
    }

    pub fn with_dropout(mut self, probability: f32) -> Self {
        self.dropout = Some(DropoutConfig { probability });
        self
    }

    pub fn with_impulse(mut self, rate_hz: f32, amplitude: f32) -> Self {
        self.impulse = Some(ImpulseNoiseConfig { rate_hz, amplitude });
        self
    }

    pub fn with_jitter(mut self, max_ms: u64) -> Self {
        self.jitter = Some(JitterConfig { max_ms });
        self
    }
}

/// Independent Gaussian noise on every axis
#[derive(Clone, Debug)]
pub struct AdditiveNoiseConfig {
    pub std_dev: f32,
}

/// Random loss of one axis per sample, producing malformed samples
#[derive(Clone, Debug)]
pub struct DropoutConfig {
    pub probability: f32,
}

/// Isolated single-sample spikes (knocks, taps on the device)
#[derive(Clone, Debug)]
pub struct ImpulseNoiseConfig {
    pub rate_hz: f32,
    pub amplitude: f32,
}

/// Irregular delivery: each timestamp is delayed by up to `max_ms`
/// without reordering samples
#[derive(Clone, Debug)]
pub struct JitterConfig {
    pub max_ms: u64,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn map_axes(sample: &mut RawSample, mut f: impl FnMut(f32) -> f32) {
    for axis in [&mut sample.x, &mut sample.y, &mut sample.z] {
        if let Some(v) = axis.as_mut() {
            *v = f(*v);
        }
    }
}

fn apply_additive_noise(samples: &mut [RawSample], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let Ok(normal) = Normal::new(0.0f32, config.std_dev) else {
        log::warn!("Invalid noise standard deviation {}", config.std_dev);
        return;
    };

    for sample in samples.iter_mut() {
        map_axes(sample, |v| v + normal.sample(rng));
    }
}

fn apply_impulse_noise(
    samples: &mut [RawSample],
    config: &ImpulseNoiseConfig,
    sample_rate_hz: f32,
    rng: &mut ChaCha8Rng,
) {
    let n = samples.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between_impulses = sample_rate_hz / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f32>() * 2.0 * avg_samples_between_impulses) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        map_axes(&mut samples[pos], |v| v + sign * config.amplitude);
    }
}

fn apply_dropout(samples: &mut [RawSample], config: &DropoutConfig, rng: &mut ChaCha8Rng) {
    for sample in samples.iter_mut() {
        if rng.random::<f32>() < config.probability {
            match (rng.random::<f32>() * 3.0) as usize {
                0 => sample.x = None,
                1 => sample.y = None,
                _ => sample.z = None,
            }
        }
    }
}

fn apply_jitter(samples: &mut [RawSample], config: &JitterConfig, rng: &mut ChaCha8Rng) {
    let mut floor = 0u64;
    for sample in samples.iter_mut() {
        let delay = (rng.random::<f32>() * (config.max_ms + 1) as f32) as u64;
        sample.timestamp_ms = (sample.timestamp_ms + delay.min(config.max_ms)).max(floor);
        floor = sample.timestamp_ms;
    }
}

pub fn apply_noise(clean: &[RawSample], config: &NoiseConfig, sample_rate_hz: f32) -> Vec<RawSample> {
    let mut samples = clean.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut samples, additive_config, &mut rng);
    }

    if let Some(ref impulse_config) = config.impulse {
        apply_impulse_noise(&mut samples, impulse_config, sample_rate_hz, &mut rng);
    }

    if let Some(ref jitter_config) = config.jitter {
        apply_jitter(&mut samples, jitter_config, &mut rng);
    }

    if let Some(ref dropout_config) = config.dropout {
        apply_dropout(&mut samples, dropout_config, &mut rng);
    }

    samples
}

pub fn generate_noisy_walk(
    duration_secs: f32,
    cadence_spm: f32,
    profile: &super::WalkProfile,
    noise_config: &NoiseConfig,
) -> Vec<RawSample> {
    let clean = super::generate_walk(duration_secs, cadence_spm, profile);
    apply_noise(&clean, noise_config, profile.sample_rate_hz)
}
