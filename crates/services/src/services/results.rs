//! Per-field aggregation of a form's responses for the results dashboard.

use std::collections::BTreeMap;

use db::models::response::ResponseRecord;
use forms::{AnswerValue, FieldSchema, FieldType};
use serde::Serialize;
use ts_rs::TS;

/// Aggregated view of all responses to one form.
#[derive(Debug, Clone, Serialize, TS)]
pub struct FormResults {
    pub response_count: usize,
    pub fields: Vec<FieldResults>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct FieldResults {
    pub field_id: String,
    pub label: String,
    pub summary: FieldSummary,
}

/// Shape of the aggregate depends on the field type.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSummary {
    /// rating/nps/number: counts per observed integer value plus the mean.
    Scale {
        histogram: Vec<ScaleBucket>,
        average: Option<f64>,
    },
    /// select/radio/checkbox: selection counts per declared option.
    Options { counts: Vec<OptionCount> },
    /// Everything else: the non-empty texts, in submission order.
    Texts { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ScaleBucket {
    pub value: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct OptionCount {
    pub value: String,
    pub label: String,
    pub count: usize,
}

/// Aggregate responses field by field, in the form's field order.
pub fn aggregate(fields: &[FieldSchema], responses: &[ResponseRecord]) -> FormResults {
    let answers: Vec<_> = responses.iter().map(ResponseRecord::parsed_answers).collect();

    let field_results = fields
        .iter()
        .map(|field| {
            let values = answers.iter().filter_map(|a| a.get(&field.id));
            let summary = match field.field_type {
                FieldType::Rating | FieldType::Nps | FieldType::Number => {
                    scale_summary(values.collect())
                }
                FieldType::Select | FieldType::Radio | FieldType::Checkbox => {
                    options_summary(field, values.collect())
                }
                _ => texts_summary(values.collect()),
            };
            FieldResults {
                field_id: field.id.clone(),
                label: field.label.clone(),
                summary,
            }
        })
        .collect();

    FormResults {
        response_count: responses.len(),
        fields: field_results,
    }
}

fn scale_summary(values: Vec<&AnswerValue>) -> FieldSummary {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut sum = 0.0;
    let mut n = 0usize;
    for value in values {
        if let Some(number) = value.coerce_number() {
            sum += number;
            n += 1;
            if number.fract() == 0.0 {
                *counts.entry(number as i64).or_default() += 1;
            }
        }
    }
    FieldSummary::Scale {
        histogram: counts
            .into_iter()
            .map(|(value, count)| ScaleBucket { value, count })
            .collect(),
        average: if n == 0 { None } else { Some(sum / n as f64) },
    }
}

fn options_summary(field: &FieldSchema, values: Vec<&AnswerValue>) -> FieldSummary {
    let counts = field
        .options
        .iter()
        .map(|option| {
            let count = values
                .iter()
                .filter(|value| match value {
                    AnswerValue::Text(s) => s == &option.value,
                    AnswerValue::Many(selected) => selected.contains(&option.value),
                    AnswerValue::Number(_) => false,
                })
                .count();
            OptionCount {
                value: option.value.clone(),
                label: option.label.clone(),
                count,
            }
        })
        .collect();
    FieldSummary::Options { counts }
}

fn texts_summary(values: Vec<&AnswerValue>) -> FieldSummary {
    FieldSummary::Texts {
        values: values
            .into_iter()
            .filter_map(|v| v.as_text())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forms::{Answers, FieldOption};
    use uuid::Uuid;

    fn record(answers: Answers) -> ResponseRecord {
        ResponseRecord {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            answers: serde_json::to_string(&answers).unwrap(),
            submitted_at: Utc::now(),
        }
    }

    fn rating_answers(value: f64) -> Answers {
        let mut a = Answers::new();
        a.insert("q1".into(), AnswerValue::Number(value));
        a
    }

    #[test]
    fn rating_histogram_counts_observed_values() {
        let fields = vec![FieldSchema::new("q1", "Score", FieldType::Rating)];
        let responses = vec![
            record(rating_answers(5.0)),
            record(rating_answers(4.0)),
            record(rating_answers(5.0)),
        ];

        let results = aggregate(&fields, &responses);
        assert_eq!(results.response_count, 3);
        match &results.fields[0].summary {
            FieldSummary::Scale { histogram, average } => {
                assert_eq!(histogram.len(), 2);
                assert_eq!((histogram[0].value, histogram[0].count), (4, 1));
                assert_eq!((histogram[1].value, histogram[1].count), (5, 2));
                assert!((average.unwrap() - 14.0 / 3.0).abs() < 1e-9);
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[test]
    fn option_counts_cover_single_and_multi_choice() {
        let fields = vec![
            FieldSchema::new("pick", "Pick one", FieldType::Radio).with_options(vec![
                FieldOption::new("Yes", "yes"),
                FieldOption::new("No", "no"),
            ]),
            FieldSchema::new("multi", "Pick many", FieldType::Checkbox).with_options(vec![
                FieldOption::new("Dashboard", "dashboard"),
                FieldOption::new("Reporting", "reporting"),
            ]),
        ];

        let mut a1 = Answers::new();
        a1.insert("pick".into(), AnswerValue::Text("yes".into()));
        a1.insert(
            "multi".into(),
            AnswerValue::Many(vec!["dashboard".into(), "reporting".into()]),
        );
        let mut a2 = Answers::new();
        a2.insert("pick".into(), AnswerValue::Text("yes".into()));
        a2.insert("multi".into(), AnswerValue::Many(vec!["reporting".into()]));

        let results = aggregate(&fields, &[record(a1), record(a2)]);
        match &results.fields[0].summary {
            FieldSummary::Options { counts } => {
                assert_eq!(counts[0].count, 2); // yes
                assert_eq!(counts[1].count, 0); // no
            }
            other => panic!("unexpected summary: {other:?}"),
        }
        match &results.fields[1].summary {
            FieldSummary::Options { counts } => {
                assert_eq!(counts[0].count, 1); // dashboard
                assert_eq!(counts[1].count, 2); // reporting
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[test]
    fn text_summaries_skip_blank_answers() {
        let fields = vec![FieldSchema::new("q", "Comments", FieldType::Textarea)];
        let mut a1 = Answers::new();
        a1.insert("q".into(), AnswerValue::Text("Faster loading times.".into()));
        let mut a2 = Answers::new();
        a2.insert("q".into(), AnswerValue::Text(String::new()));

        let results = aggregate(&fields, &[record(a1), record(a2)]);
        match &results.fields[0].summary {
            FieldSummary::Texts { values } => {
                assert_eq!(values, &vec!["Faster loading times.".to_string()]);
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }

    #[test]
    fn missing_answers_do_not_panic() {
        let fields = vec![FieldSchema::new("q1", "Score", FieldType::Rating)];
        let results = aggregate(&fields, &[record(Answers::new())]);
        match &results.fields[0].summary {
            FieldSummary::Scale { histogram, average } => {
                assert!(histogram.is_empty());
                assert!(average.is_none());
            }
            other => panic!("unexpected summary: {other:?}"),
        }
    }
}
