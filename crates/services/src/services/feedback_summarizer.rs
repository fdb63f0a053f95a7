//! AI feedback summarization over a form's textual answers.

use db::models::{form::Form, response::ResponseRecord};
use forms::{FieldSchema, FieldType};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::claude_api::{ClaudeApiClient, ClaudeApiError};

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("claude api error: {0}")]
    ClaudeApi(#[from] ClaudeApiError),
    #[error("form not found")]
    FormNotFound,
    #[error("no textual feedback to summarize")]
    NoTextFeedback,
}

/// Summarizes the free-text answers of a form's responses in one AI call.
pub struct FeedbackSummarizer {
    pool: SqlitePool,
    claude: ClaudeApiClient,
}

impl FeedbackSummarizer {
    pub fn new(pool: SqlitePool, claude: ClaudeApiClient) -> Self {
        Self { pool, claude }
    }

    pub async fn summarize_form(&self, form_id: Uuid) -> Result<String, SummarizerError> {
        let form = Form::find_by_id(&self.pool, form_id)
            .await?
            .ok_or(SummarizerError::FormNotFound)?;
        let responses = ResponseRecord::find_by_form_id(&self.pool, form_id).await?;

        let texts = collect_texts(&form.parsed_fields(), &responses);
        if texts.is_empty() {
            return Err(SummarizerError::NoTextFeedback);
        }

        info!(form_id = %form_id, texts = texts.len(), "summarizing feedback");
        self.summarize(&texts).await
    }

    /// The raw call shape: a list of feedback texts in, one summary out.
    pub async fn summarize(&self, texts: &[String]) -> Result<String, SummarizerError> {
        let joined = texts
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"Summarize the following survey feedback responses. Highlight recurring
themes, praise and complaints. Keep the summary short and concrete.

## Feedback
{joined}
"#
        );

        let system = Some(
            "You are an analyst summarizing customer feedback for a product team. \
             Be factual and concise; do not invent feedback that is not present."
                .to_string(),
        );

        Ok(self.claude.ask(&prompt, system, 1024).await?)
    }
}

/// Gather the non-empty free-text answers (text and textarea fields) across
/// all responses, in field order then response order.
pub fn collect_texts(fields: &[FieldSchema], responses: &[ResponseRecord]) -> Vec<String> {
    let text_field_ids: Vec<&str> = fields
        .iter()
        .filter(|f| matches!(f.field_type, FieldType::Text | FieldType::Textarea))
        .map(|f| f.id.as_str())
        .collect();

    let mut texts = Vec::new();
    for field_id in text_field_ids {
        for response in responses {
            if let Some(text) = response
                .parsed_answers()
                .get(field_id)
                .and_then(|v| v.as_text().map(str::trim).map(str::to_string))
            {
                if !text.is_empty() {
                    texts.push(text);
                }
            }
        }
    }
    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forms::{AnswerValue, Answers};

    fn record(form_id: Uuid, answers: Answers) -> ResponseRecord {
        ResponseRecord {
            id: Uuid::new_v4(),
            form_id,
            answers: serde_json::to_string(&answers).unwrap(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn collects_only_nonempty_text_answers() {
        let form_id = Uuid::new_v4();
        let fields = vec![
            FieldSchema::new("q1", "Score", FieldType::Rating),
            FieldSchema::new("q2", "Liked most", FieldType::Textarea),
            FieldSchema::new("q3", "Name", FieldType::Text),
        ];

        let mut a1 = Answers::new();
        a1.insert("q1".into(), AnswerValue::Number(5.0));
        a1.insert("q2".into(), AnswerValue::Text("Great support!".into()));
        a1.insert("q3".into(), AnswerValue::Text("  ".into()));

        let mut a2 = Answers::new();
        a2.insert("q2".into(), AnswerValue::Text(String::new()));
        a2.insert("q3".into(), AnswerValue::Text("Ada".into()));

        let texts = collect_texts(&fields, &[record(form_id, a1), record(form_id, a2)]);
        assert_eq!(texts, vec!["Great support!".to_string(), "Ada".to_string()]);
    }

    #[test]
    fn ratings_and_lists_are_never_collected() {
        let form_id = Uuid::new_v4();
        let fields = vec![FieldSchema::new("q1", "Features", FieldType::Checkbox)];
        let mut answers = Answers::new();
        answers.insert("q1".into(), AnswerValue::Many(vec!["dashboard".into()]));
        assert!(collect_texts(&fields, &[record(form_id, answers)]).is_empty());
    }
}
