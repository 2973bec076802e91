//! Report rendering

use super::{ReportData, ReportFormat};
use crate::error::{Error, Result};

pub const CSV_HEADER: [&str; 4] = ["PDF Name", "Property", "Before Processing", "After Processing"];

/// Formats report data into the supported output formats
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(data: &ReportData, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Csv => Ok(Self::to_csv(data)),
            ReportFormat::Json => Self::to_json(data),
        }
    }

    fn to_csv(data: &ReportData) -> String {
        let mut output = String::new();
        push_record(&mut output, &CSV_HEADER);
        for (file, rows) in &data.files {
            for row in rows {
                push_record(
                    &mut output,
                    &[file.as_str(), row.property.as_str(), row.before.as_str(), row.after.as_str()],
                );
            }
        }
        output
    }

    fn to_json(data: &ReportData) -> Result<String> {
        serde_json::to_string_pretty(data).map_err(|e| Error::ReportError(e.to_string()))
    }
}

fn push_record(output: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        output.push_str(&escape_csv(field));
    }
    output.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote, or line break
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
