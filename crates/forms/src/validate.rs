use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{FieldSchema, FieldType};
use crate::store::{AnswerValue, ValueStore};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

/// Acceptance predicate for one field, derived from its type.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// text, textarea, radio, select, date: required means non-empty string.
    Text { required: bool },
    /// email: required means e-mail syntax; optional admits the empty string.
    Email { required: bool },
    /// number/rating/nps: coerce to numeric; `min` applies only when required.
    Numeric { required: bool, min: f64 },
    /// checkbox group: required means at least one selection.
    OptionList { required: bool },
    /// Fail-open fallback for unrecognized field types; never rejects.
    Unconstrained,
}

/// A rule bound to the field it validates.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub field_id: String,
    pub label: String,
    pub rule: Rule,
}

/// One field-level validation failure, surfaced inline next to the control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

impl FieldError {
    fn new(field_id: &str, message: String) -> Self {
        Self {
            field_id: field_id.to_string(),
            message,
        }
    }
}

/// The compiled ruleset for one field list. A pure function of the list:
/// identical input yields an identical ruleset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ruleset {
    rules: Vec<CompiledRule>,
}

/// Compile a field list into its validation ruleset. Must be re-run whenever
/// the field list changes; the result is never cached across edits.
pub fn compile(fields: &[FieldSchema]) -> Ruleset {
    let rules = fields
        .iter()
        .map(|field| {
            let rule = match field.field_type {
                FieldType::Text
                | FieldType::Textarea
                | FieldType::Radio
                | FieldType::Select
                | FieldType::Date => Rule::Text {
                    required: field.required,
                },
                FieldType::Email => Rule::Email {
                    required: field.required,
                },
                FieldType::Number => Rule::Numeric {
                    required: field.required,
                    min: field.min_rating.map_or(f64::NEG_INFINITY, f64::from),
                },
                FieldType::Rating => Rule::Numeric {
                    required: field.required,
                    min: 1.0,
                },
                FieldType::Nps => Rule::Numeric {
                    required: field.required,
                    min: 0.0,
                },
                FieldType::Checkbox => Rule::OptionList {
                    required: field.required,
                },
                FieldType::Unknown => Rule::Unconstrained,
            };
            CompiledRule {
                field_id: field.id.clone(),
                label: field.label.clone(),
                rule,
            }
        })
        .collect();
    Ruleset { rules }
}

impl Ruleset {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Evaluate every rule against the store, returning all violations.
    pub fn check(&self, store: &ValueStore) -> Vec<FieldError> {
        self.rules
            .iter()
            .filter_map(|rule| rule.check(store.get(&rule.field_id)))
            .collect()
    }

    pub fn is_valid(&self, store: &ValueStore) -> bool {
        self.check(store).is_empty()
    }
}

impl CompiledRule {
    fn check(&self, value: Option<&AnswerValue>) -> Option<FieldError> {
        let message = match &self.rule {
            Rule::Unconstrained => return None,
            Rule::Text { required } => match value {
                None | Some(AnswerValue::Text(_)) => {
                    let present = value
                        .and_then(AnswerValue::as_text)
                        .is_some_and(|s| !s.is_empty());
                    if *required && !present {
                        format!("{} is required.", self.label)
                    } else {
                        return None;
                    }
                }
                Some(_) => format!("{} has an unexpected value.", self.label),
            },
            Rule::Email { required } => match value {
                None | Some(AnswerValue::Text(_)) => {
                    let text = value.and_then(AnswerValue::as_text).unwrap_or("");
                    if text.is_empty() {
                        if *required {
                            format!("{} must be a valid email.", self.label)
                        } else {
                            return None;
                        }
                    } else if !EMAIL_RE.is_match(text) {
                        format!("{} must be a valid email.", self.label)
                    } else {
                        return None;
                    }
                }
                Some(_) => format!("{} has an unexpected value.", self.label),
            },
            Rule::Numeric { required, min } => match value {
                Some(AnswerValue::Many(_)) => format!("{} must be a number.", self.label),
                _ => {
                    let absent = match value {
                        None => true,
                        Some(AnswerValue::Text(s)) => s.trim().is_empty(),
                        _ => false,
                    };
                    if absent {
                        if *required {
                            format!("{} is required.", self.label)
                        } else {
                            return None;
                        }
                    } else {
                        match value.and_then(AnswerValue::coerce_number) {
                            None => format!("{} must be a number.", self.label),
                            Some(n) if *required && n < *min => {
                                format!("{} is required.", self.label)
                            }
                            Some(_) => return None,
                        }
                    }
                }
            },
            Rule::OptionList { required } => match value {
                None | Some(AnswerValue::Many(_)) => {
                    let count = value.and_then(AnswerValue::as_list).map_or(0, |l| l.len());
                    if *required && count == 0 {
                        format!("Please select at least one option for {}.", self.label)
                    } else {
                        return None;
                    }
                }
                Some(_) => format!("{} has an unexpected value.", self.label),
            },
        };
        Some(FieldError::new(&self.field_id, message))
    }
}
