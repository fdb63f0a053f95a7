//! CSV export of a form's responses: one row per response, one column per
//! field in form order.

use db::models::{form::Form, response::ResponseRecord};
use forms::AnswerValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render responses as a CSV document. Columns are the response id, the
/// field labels in the form's field order, and the submission timestamp;
/// answers missing from a record render as `N/A`.
pub fn responses_to_csv(form: &Form, responses: &[ResponseRecord]) -> Result<String, ExportError> {
    let fields = form.parsed_fields();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(fields.len() + 2);
    header.push("Response ID".to_string());
    header.extend(fields.iter().map(|f| f.label.clone()));
    header.push("Submitted At".to_string());
    writer.write_record(&header)?;

    for response in responses {
        let answers = response.parsed_answers();
        let mut row = Vec::with_capacity(fields.len() + 2);
        let id = response.id.to_string();
        row.push(id[..8].to_string());
        for field in &fields {
            row.push(answers.get(&field.id).map_or("N/A".to_string(), format_cell));
        }
        row.push(response.submitted_at.to_rfc3339());
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn format_cell(value: &AnswerValue) -> String {
    match value {
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        AnswerValue::Number(n) => n.to_string(),
        AnswerValue::Many(items) => items.join(", "),
    }
}
