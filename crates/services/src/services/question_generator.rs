//! AI question suggestion: a topic in, a list of suggested fields out.

use forms::{FieldOption, FieldType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::claude_api::{ClaudeApiClient, ClaudeApiError};

#[derive(Debug, Error)]
pub enum QuestionGeneratorError {
    #[error("claude api error: {0}")]
    ClaudeApi(#[from] ClaudeApiError),
    #[error("topic must not be empty")]
    EmptyTopic,
}

/// One AI-suggested question, normalized into builder-ready shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct SuggestedQuestion {
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub options: Vec<FieldOption>,
}

/// Raw response shape requested from the model.
#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    questions: Vec<RawSuggestion>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    label: String,
    #[serde(rename = "type")]
    field_type: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    label: String,
    #[serde(default)]
    value: Option<String>,
}

/// Service turning a survey topic (or pasted question text) into suggested
/// form fields.
pub struct QuestionGenerator {
    claude: ClaudeApiClient,
}

impl QuestionGenerator {
    pub fn new(claude: ClaudeApiClient) -> Self {
        Self { claude }
    }

    pub async fn generate(
        &self,
        topic: &str,
    ) -> Result<Vec<SuggestedQuestion>, QuestionGeneratorError> {
        if topic.trim().is_empty() {
            return Err(QuestionGeneratorError::EmptyTopic);
        }

        let prompt = format!(
            r#"Suggest survey questions for the following topic. If the topic already
contains questions (e.g. pasted from a document), parse those instead of
inventing new ones.

## Topic
{topic}

## Output Format
Return ONLY valid JSON with this structure:
```json
{{
  "questions": [
    {{
      "label": "The question text",
      "type": "text|textarea|select|radio|checkbox|rating|nps|date|email|number",
      "options": [{{"label": "Option label", "value": "option-value"}}]
    }}
  ]
}}
```
Include "options" only for select, radio and checkbox questions.
"#
        );

        let system = Some(
            "You are a survey design assistant. Suggest concise, unbiased questions \
             appropriate for the given topic, choosing the most natural input type \
             for each. Output valid JSON only."
                .to_string(),
        );

        let response: SuggestionResponse = self.claude.ask_json(&prompt, system, 4096).await?;
        let questions: Vec<SuggestedQuestion> = response
            .questions
            .into_iter()
            .map(normalize_suggestion)
            .collect();

        info!(count = questions.len(), "generated question suggestions");
        Ok(questions)
    }
}

/// Normalize one raw suggestion: unknown type tags fall back to plain text
/// rather than rejecting, and missing option values are derived from labels.
fn normalize_suggestion(raw: RawSuggestion) -> SuggestedQuestion {
    let field_type = raw
        .field_type
        .as_deref()
        .map_or(FieldType::Text, parse_field_type);
    let options = if field_type.requires_options() {
        raw.options
            .into_iter()
            .map(|opt| {
                FieldOption::new(opt.label, opt.value.unwrap_or_default()).ensure_value()
            })
            .collect()
    } else {
        Vec::new()
    };
    SuggestedQuestion {
        label: raw.label,
        field_type,
        options,
    }
}

/// Model output is not trusted to stay inside the tag set: anything
/// unrecognized becomes a plain text question instead of being dropped.
fn parse_field_type(s: &str) -> FieldType {
    match FieldType::from_tag(&s.to_lowercase()) {
        FieldType::Unknown => FieldType::Text,
        known => known,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_tags_fall_back_to_text() {
        assert_eq!(parse_field_type("rating"), FieldType::Rating);
        assert_eq!(parse_field_type("RADIO"), FieldType::Radio);
        assert_eq!(parse_field_type("likert_grid"), FieldType::Text);
    }

    #[test]
    fn normalization_derives_missing_option_values() {
        let raw = RawSuggestion {
            label: "Which features do you use?".into(),
            field_type: Some("checkbox".into()),
            options: vec![
                RawOption {
                    label: "Dashboard".into(),
                    value: None,
                },
                RawOption {
                    label: "Live Reports".into(),
                    value: Some("reports".into()),
                },
            ],
        };
        let suggestion = normalize_suggestion(raw);
        assert_eq!(suggestion.options[0].value, "dashboard");
        assert_eq!(suggestion.options[1].value, "reports");
    }

    #[test]
    fn options_are_dropped_for_non_option_types() {
        let raw = RawSuggestion {
            label: "How satisfied are you?".into(),
            field_type: Some("rating".into()),
            options: vec![RawOption {
                label: "Ignored".into(),
                value: None,
            }],
        };
        assert!(normalize_suggestion(raw).options.is_empty());
    }
}
