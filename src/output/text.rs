use crate::cadence::HistoryBuffer;
use crate::processing::TickOutput;

use super::Formatter;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One character per history slot, scaled to the largest rate held
///
/// Uninitialized slots render as spaces.
pub fn sparkline(history: &HistoryBuffer) -> String {
    let max = history.max_rate().unwrap_or(0.0);
    history
        .iter()
        .map(|slot| match slot {
            None => ' ',
            Some(_) if max <= 0.0 => BARS[0],
            Some(rate) => {
                let level = (rate / max * (BARS.len() - 1) as f32).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &TickOutput, history: &HistoryBuffer) -> String {
        let rate = output
            .rate
            .map_or("   ---".to_string(), |r| format!("{:>6.1}", r));
        if self.verbose {
            format!(
                "Cadence: {} spm  state: {:<13} [events: {:>3}] |{}|",
                rate,
                output.state,
                output.window_events,
                sparkline(history)
            )
        } else {
            format!("Cadence: {} spm  state: {}", rate, output.state)
        }
    }
}
