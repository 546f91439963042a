//! Numeric constants shared by the cadence pipeline
//!
//! Time is carried as monotonic milliseconds everywhere; these constants
//! convert between that basis and the per-minute rates reported downstream.

/// Milliseconds in one second.
pub const MS_PER_SECOND: f32 = 1000.0;

/// Milliseconds in one minute. Rates are expressed in events per minute.
pub const MS_PER_MINUTE: f32 = 60_000.0;

/// Standard gravity in m/s². Used by the synthetic signal generators and as
/// the reference scale for the default peak threshold.
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Smallest event span treated as non-zero by the span-based rate formula.
pub const MIN_SPAN_MS: f32 = 1e-3;
