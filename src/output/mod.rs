mod csv;
mod json;
mod text;

use chrono::Utc;

use crate::cadence::HistoryBuffer;
use crate::processing::TickOutput;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::{TextFormatter, sparkline};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Renders one tick for the presentation layer
pub trait Formatter: Send {
    fn format(&self, output: &TickOutput, history: &HistoryBuffer) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
