//! Configuration for the cadence pipeline.
//!
//! Every section has sensible defaults; a TOML file only needs to name the
//! values it overrides:
//!
//! ```toml
//! [peak]
//! threshold = 1.5
//! min_interval_ms = 300
//!
//! [rate]
//! method = "span"
//! window_secs = 4.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CadenceError, Result};

/// Tick period specification
///
/// Can be given as a period or as a rate, whichever is more natural for the
/// caller. Stored internally as whole milliseconds.
///
/// # Parsing formats
/// - `500` - period in milliseconds (no suffix)
/// - `500ms` - period in milliseconds (explicit)
/// - `0.5s` - period in seconds
/// - `2hz` or `2Hz` - ticks per second
///
/// # Example
/// ```
/// use stepcadence::config::TickPeriod;
///
/// let period: TickPeriod = "4hz".parse().unwrap();
/// assert_eq!(period.as_millis(), 250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct TickPeriod(u64);

impl TickPeriod {
    /// Create from a period in milliseconds
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create from a tick rate in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self((1000.0 / hz).round() as u64)
    }

    /// Get the period in milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for TickPeriod {
    fn default() -> Self {
        Self::from_millis(500)
    }
}

impl fmt::Display for TickPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl FromStr for TickPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(num) = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
        {
            let hz: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid tick rate: {}", s))?;
            if !(hz > 0.0 && hz <= 1000.0) {
                return Err("tick rate must be in (0, 1000] Hz".to_string());
            }
            return Ok(Self::from_hz(hz));
        }

        // "ms" must be checked before "s"
        let (num, scale) = if let Some(num) = s.strip_suffix("ms") {
            (num, 1.0)
        } else if let Some(num) = s.strip_suffix('s') {
            (num, 1000.0)
        } else {
            (s, 1.0)
        };

        let value: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid tick period: {}", s))?;
        let ms = (value * scale).round();
        if ms < 1.0 {
            return Err("tick period must be at least 1ms".to_string());
        }
        Ok(Self::from_millis(ms as u64))
    }
}

impl TryFrom<String> for TickPeriod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Rate formula used by the estimator
///
/// The two formulas agree for dense, evenly spaced events and diverge when
/// only a few events are in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RateMethod {
    /// `(count - 1)` intervals over the span between first and last event
    Span,
    /// `count` events over the full window length
    #[default]
    Density,
}

/// System-wide cadence configuration
///
/// Use `CadenceConfig::default()` for sensible defaults.
///
/// # Example
/// ```
/// use stepcadence::config::{CadenceConfig, RateMethod};
///
/// let mut config = CadenceConfig::default();
/// config.rate.method = RateMethod::Span;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Gravity compensation filter
    pub gravity: GravityConfig,
    /// Event (peak) detection
    pub peak: PeakConfig,
    /// Sliding-window rate estimation
    pub rate: RateConfig,
    /// Rate-to-state bands
    pub classifier: ClassifierConfig,
    /// Rate history for display
    pub history: HistoryConfig,
    /// Periodic tick driver
    pub tick: TickConfig,
}

/// Gravity compensation filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Smoothing factor in (0, 1); higher tracks orientation changes more slowly
    pub alpha: f32,
}

/// Peak detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Minimum peak magnitude of linear acceleration (m/s²)
    pub threshold: f32,
    /// Minimum rise from the pre-peak sample (m/s²). `None` disables the check.
    pub min_prominence: Option<f32>,
    /// Refractory interval: minimum time between accepted events in milliseconds
    pub min_interval_ms: u64,
}

/// Rate estimator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Length of the trailing event window in seconds
    pub window_secs: f32,
    /// Formula used to turn the window contents into a rate
    pub method: RateMethod,
}

/// One bounded classification band
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BandConfig {
    /// Label reported for rates in this band
    pub label: String,
    /// Exclusive upper bound in events per minute
    pub upper: f32,
}

/// Classification band configuration
///
/// Bands are listed in ascending order of their upper bounds. Rates at or
/// above the last bound map to `final_label`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub bands: Vec<BandConfig>,
    pub final_label: String,
}

/// Rate history configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of retained rate samples
    pub capacity: usize,
}

/// Tick driver configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    pub period: TickPeriod,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self { alpha: 0.8 }
    }
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            threshold: 1.2,
            min_prominence: Some(0.3),
            min_interval_ms: 250, // caps the rate at 240 events/min
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            window_secs: 5.0,
            method: RateMethod::Density,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let band = |label: &str, upper: f32| BandConfig {
            label: label.to_string(),
            upper,
        };
        Self {
            bands: vec![
                band("still", 10.0),
                band("shuffling", 60.0),
                band("walking", 110.0),
                band("brisk", 140.0),
            ],
            final_label: "running".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        // 30 seconds at the default tick period
        Self { capacity: 60 }
    }
}

impl CadenceConfig {
    /// Parse a (possibly partial) TOML configuration and validate it
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check that every parameter is in range
    pub fn validate(&self) -> Result<()> {
        let alpha = self.gravity.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(CadenceError::Config(format!(
                "gravity.alpha must be in (0, 1), got {}",
                alpha
            )));
        }

        if !self.peak.threshold.is_finite() || self.peak.threshold < 0.0 {
            return Err(CadenceError::Config(format!(
                "peak.threshold must be a non-negative number, got {}",
                self.peak.threshold
            )));
        }
        if let Some(p) = self.peak.min_prominence {
            if !p.is_finite() || p < 0.0 {
                return Err(CadenceError::Config(format!(
                    "peak.min_prominence must be a non-negative number, got {}",
                    p
                )));
            }
        }

        if !(self.rate.window_secs.is_finite() && self.rate.window_secs > 0.0) {
            return Err(CadenceError::Config(format!(
                "rate.window_secs must be positive, got {}",
                self.rate.window_secs
            )));
        }

        if self.history.capacity == 0 {
            return Err(CadenceError::Config(
                "history.capacity must be at least 1".to_string(),
            ));
        }

        if self.tick.period.as_millis() == 0 {
            return Err(CadenceError::Config(
                "tick.period must be at least 1ms".to_string(),
            ));
        }

        // Band ordering is checked by the classifier itself
        crate::cadence::StateClassifier::new(&self.classifier).map(|_| ())
    }
}
