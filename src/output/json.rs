use super::Formatter;
use crate::processing::OrientationRecord;

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &OrientationRecord) -> String {
        serde_json::to_string(record)
            .unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}
