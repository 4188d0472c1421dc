mod csv;
mod json;
mod text;

use crate::processing::OrientationRecord;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

pub trait Formatter {
    fn format(&self, record: &OrientationRecord) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Csv => Box::new(CsvFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn optional(value: Option<f64>, precision: usize, missing: &str) -> String {
    value.map_or(missing.to_string(), |v| format!("{:.*}", precision, v))
}
