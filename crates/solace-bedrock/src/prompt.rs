//! Prompt assembly for column-mapping requests.

use solace_core::models::import::TargetField;
use solace_import::sample::CsvSample;

/// Instructions plus the list of allowed target fields.
pub fn system_prompt() -> String {
    let fields = TargetField::ALL
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You map columns of a patient export from a practice-management system \
onto patient fields. Allowed target fields: {fields}. \
Reply with JSON only, in the form \
{{\"mappings\": [{{\"sourceColumn\": string, \"targetField\": string, \"confidence\": number}}]}}. \
Confidence is between 0 and 1. Omit columns that match no field. \
Use each source column and each target field at most once."
    )
}

/// The sample as an XML-style block for the user turn.
pub fn build_sample_block(sample: &CsvSample) -> String {
    let mut block = String::from("<csv_sample>\n");

    for (index, column) in sample.columns.iter().enumerate() {
        block.push_str(&format!("<column name=\"{}\">\n", escape(column)));
        for value in sample.values(index) {
            block.push_str(&format!("<value>{}</value>\n", escape(value)));
        }
        block.push_str("</column>\n");
    }

    block.push_str("</csv_sample>");
    block
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
