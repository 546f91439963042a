use crate::error::{CadenceError, Result};
use crate::signal_processing::Vector3;

/// One accelerometer reading as delivered by a sensor
///
/// Axes are optional because platforms may deliver partial readings. A
/// sample with any missing or non-finite axis is malformed and is dropped
/// before it reaches the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Monotonic arrival time in milliseconds
    pub timestamp_ms: u64,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl RawSample {
    /// Complete sample with all three axes present
    pub fn new(timestamp_ms: u64, x: f32, y: f32, z: f32) -> Self {
        Self {
            timestamp_ms,
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    pub fn from_vector(timestamp_ms: u64, v: Vector3) -> Self {
        Self::new(timestamp_ms, v.x, v.y, v.z)
    }

    /// The acceleration vector, if every axis is present and finite
    pub fn acceleration(&self) -> Option<Vector3> {
        let v = Vector3::new(self.x?, self.y?, self.z?);
        v.is_finite().then_some(v)
    }

    pub fn is_complete(&self) -> bool {
        self.acceleration().is_some()
    }
}

/// Parse one axis field; empty or unparseable text means "no data"
fn parse_axis(field: Option<&str>) -> Option<f32> {
    let field = field?.trim();
    if field.is_empty() {
        return None;
    }
    field.parse().ok()
}

/// Parse the `x,y,z` fields of a line into a sample at `timestamp_ms`
pub fn parse_axes(fields: &str, timestamp_ms: u64) -> RawSample {
    let mut parts = fields.split(',');
    RawSample {
        timestamp_ms,
        x: parse_axis(parts.next()),
        y: parse_axis(parts.next()),
        z: parse_axis(parts.next()),
    }
}

/// Parse one line of a `t_ms,x,y,z` recording
///
/// Returns `Ok(None)` for blank lines, `#` comments and a header on the
/// first line. Missing axes produce a malformed sample rather than an
/// error; an unreadable timestamp is an error.
pub fn parse_recording_line(line: &str, line_number: usize) -> Result<Option<RawSample>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (t_field, rest) = line.split_once(',').unwrap_or((line, ""));
    let t_field = t_field.trim();

    match t_field.parse::<u64>() {
        Ok(timestamp_ms) => Ok(Some(parse_axes(rest, timestamp_ms))),
        Err(_) if line_number == 1 => Ok(None),
        Err(_) => Err(CadenceError::Recording {
            line: line_number,
            reason: format!("invalid timestamp '{}'", t_field),
        }),
    }
}

/// Render a sample as a `t_ms,x,y,z` recording line
pub fn format_recording_line(sample: &RawSample) -> String {
    let axis = |v: Option<f32>| v.map_or(String::new(), |v| format!("{:.4}", v));
    format!(
        "{},{},{},{}",
        sample.timestamp_ms,
        axis(sample.x),
        axis(sample.y),
        axis(sample.z)
    )
}
