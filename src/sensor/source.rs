use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crossbeam_channel::Receiver;

use super::sample::{RawSample, format_recording_line, parse_recording_line};
use crate::error::{CadenceError, Result};

pub trait SensorSource: Send {
    /// Next sample, or `None` once the sensor has been torn down
    fn next_sample(&mut self) -> Result<Option<RawSample>>;
}

/// Sensor fed by another thread over a channel
pub struct ChannelSource {
    rx: Receiver<RawSample>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<RawSample>) -> Self {
        Self { rx }
    }
}

impl SensorSource for ChannelSource {
    fn next_sample(&mut self) -> Result<Option<RawSample>> {
        match self.rx.recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(_) => Ok(None),
        }
    }
}

/// Sensor replaying a `t_ms,x,y,z` recording
pub struct RecordingSource {
    samples: Vec<RawSample>,
    position: usize,
}

impl RecordingSource {
    /// Open and parse a recording file
    ///
    /// A missing or unreadable file is reported as an unavailable sensor.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CadenceError::SensorUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut samples = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            if let Some(sample) = parse_recording_line(&line?, i + 1)? {
                samples.push(sample);
            }
        }
        Ok(Self::from_samples(samples))
    }

    pub fn from_samples(samples: Vec<RawSample>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recording length in milliseconds from first to last sample
    pub fn duration_ms(&self) -> u64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
            _ => 0,
        }
    }
}

impl SensorSource for RecordingSource {
    fn next_sample(&mut self) -> Result<Option<RawSample>> {
        let sample = self.samples.get(self.position).copied();
        if sample.is_some() {
            self.position += 1;
        }
        Ok(sample)
    }
}

/// Write samples as a `t_ms,x,y,z` recording with a header line
pub fn write_recording<P: AsRef<Path>>(path: P, samples: &[RawSample]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    writeln!(writer, "t_ms,x,y,z")?;
    for sample in samples {
        writeln!(writer, "{}", format_recording_line(sample))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_recording_from_reader() {
        let text = "t_ms,x,y,z\n0,0,0,9.8\n# pause\n20,0,,9.8\n\n40,0.1,0.1,9.9\n";
        let mut source = RecordingSource::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(source.len(), 3);
        assert_eq!(source.duration_ms(), 40);

        let first = source.next_sample().unwrap().unwrap();
        assert!(first.is_complete());
        let second = source.next_sample().unwrap().unwrap();
        assert!(!second.is_complete());
        assert!(source.next_sample().unwrap().is_some());
        assert!(source.next_sample().unwrap().is_none());
        assert!(source.next_sample().unwrap().is_none());
    }

    #[test]
    fn test_recording_bad_line_reports_line_number() {
        let text = "t_ms,x,y,z\n0,0,0,9.8\nnope,1,2,3\n";
        let result = RecordingSource::from_reader(Cursor::new(text));
        assert!(matches!(
            result,
            Err(CadenceError::Recording { line: 3, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_sensor_unavailable() {
        let result = RecordingSource::open("/nonexistent/stepcadence/recording.csv");
        assert!(matches!(result, Err(CadenceError::SensorUnavailable(_))));
    }

    #[test]
    fn test_channel_source_ends_on_disconnect() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let mut source = ChannelSource::new(rx);

        tx.send(RawSample::new(0, 0.0, 0.0, 9.8)).unwrap();
        drop(tx);

        assert!(source.next_sample().unwrap().is_some());
        assert!(source.next_sample().unwrap().is_none());
    }

    #[test]
    fn test_write_then_open() {
        let path = std::env::temp_dir().join(format!(
            "stepcadence_source_test_{}.csv",
            std::process::id()
        ));
        let samples = vec![
            RawSample::new(0, 0.0, 0.0, 9.8),
            RawSample::new(20, 0.5, 0.0, 10.2),
        ];

        write_recording(&path, &samples).unwrap();
        let source = RecordingSource::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(source.len(), 2);
        assert_eq!(source.duration_ms(), 20);
    }
}
