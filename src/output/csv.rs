use crate::cadence::HistoryBuffer;
use crate::processing::TickOutput;

use super::{Formatter, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, output: &TickOutput, _history: &HistoryBuffer) -> String {
        let rate = output
            .rate
            .map_or(String::new(), |r| format!("{:.1}", r));
        format!(
            "{},{},{},{},{}",
            iso8601_timestamp(),
            output.timestamp_ms,
            rate,
            output.state,
            output.window_events
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,t_ms,rate,state,events")
    }
}
