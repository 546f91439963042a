pub mod clock;
pub mod sample;
pub mod source;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use sample::{RawSample, parse_axes, parse_recording_line};
pub use source::{ChannelSource, RecordingSource, SensorSource, write_recording};
