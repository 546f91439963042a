use crate::cadence::HistoryBuffer;
use crate::processing::TickOutput;

use super::{Formatter, iso8601_timestamp};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, output: &TickOutput, _history: &HistoryBuffer) -> String {
        let rate = output
            .rate
            .map_or("null".to_string(), |r| format!("{:.1}", r));
        let state = serde_json::to_string(output.state.label()).unwrap_or_default();
        format!(
            r#"{{"ts":"{}","t_ms":{},"rate":{},"state":{},"events":{}}}"#,
            iso8601_timestamp(),
            output.timestamp_ms,
            rate,
            state,
            output.window_events
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ActivityState;

    #[test]
    fn test_uninitialized_is_valid_json() {
        let output = TickOutput {
            timestamp_ms: 1500,
            rate: None,
            state: ActivityState::Uninitialized,
            window_events: 0,
        };
        let line = JsonFormatter.format(&output, &HistoryBuffer::new(2));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["t_ms"], 1500);
        assert!(value["rate"].is_null());
        assert_eq!(value["state"], "uninitialized");
    }
}
