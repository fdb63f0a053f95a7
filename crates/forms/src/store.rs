use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::{FieldSchema, FieldType};

/// One answer as it lives in the value store and in a persisted response:
/// a string, a number, or a list of selected option values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Many(Vec<String>),
}

/// Flat answer map keyed by field id, the shape persisted per response.
pub type Answers = BTreeMap<String, AnswerValue>;

impl AnswerValue {
    pub fn empty_text() -> Self {
        Self::Text(String::new())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Many(items) => Some(items),
            _ => None,
        }
    }

    /// Coerce to a number the way the validator does: numbers pass through,
    /// non-empty strings are parsed. Empty strings and lists do not coerce.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse().ok()
                }
            }
            Self::Many(_) => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

/// Initial store entry for a field type: checkbox groups start as an empty
/// list, rating/NPS scales at 0, everything else as the empty string.
pub fn initial_value(field_type: FieldType) -> AnswerValue {
    match field_type {
        FieldType::Checkbox => AnswerValue::Many(Vec::new()),
        FieldType::Rating | FieldType::Nps => AnswerValue::Number(0.0),
        _ => AnswerValue::empty_text(),
    }
}

/// In-memory mapping from field id to the field's current (possibly
/// invalid) input value, live during form entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    entries: HashMap<String, AnswerValue>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a previously assembled answer map, e.g. to
    /// validate an incoming submission against the current schema.
    pub fn from_answers(answers: &Answers) -> Self {
        Self {
            entries: answers
                .iter()
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        }
    }

    /// Establish entries for a (re)established field list: initialize each
    /// new field id exactly once and drop entries for removed ids. Existing
    /// entries keep their values.
    pub fn seed(&mut self, fields: &[FieldSchema]) {
        self.entries
            .retain(|id, _| fields.iter().any(|f| &f.id == id));
        for field in fields {
            self.entries
                .entry(field.id.clone())
                .or_insert_with(|| initial_value(field.field_type));
        }
    }

    /// Reset every entry back to the initial value policy.
    pub fn reset(&mut self, fields: &[FieldSchema]) {
        self.entries.clear();
        self.seed(fields);
    }

    pub fn get(&self, field_id: &str) -> Option<&AnswerValue> {
        self.entries.get(field_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Mirror a text-like widget (text/email/number/textarea/date) or a
    /// single-choice widget (select/radio) into the store.
    pub fn set_text(&mut self, field_id: &str, value: impl Into<String>) {
        self.entries
            .insert(field_id.to_string(), AnswerValue::Text(value.into()));
    }

    /// Set a rating/NPS position; the entry becomes that 1-based (or 0-10)
    /// ordinal.
    pub fn set_rating(&mut self, field_id: &str, position: u32) {
        self.entries
            .insert(field_id.to_string(), AnswerValue::Number(position as f64));
    }

    /// Toggle one checkbox option: add the value if absent, remove exactly
    /// that value if present, preserving the order of the rest.
    pub fn toggle_option(&mut self, field_id: &str, option_value: &str) {
        let entry = self
            .entries
            .entry(field_id.to_string())
            .or_insert_with(|| AnswerValue::Many(Vec::new()));
        if let AnswerValue::Many(selected) = entry {
            if let Some(pos) = selected.iter().position(|v| v == option_value) {
                selected.remove(pos);
            } else {
                selected.push(option_value.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    fn fields() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("q1", "Name", FieldType::Text),
            FieldSchema::new("q2", "Score", FieldType::Rating),
            FieldSchema::new("q3", "Features", FieldType::Checkbox),
        ]
    }

    #[test]
    fn seed_applies_initial_value_policy() {
        let mut store = ValueStore::new();
        store.seed(&fields());
        assert_eq!(store.get("q1"), Some(&AnswerValue::Text(String::new())));
        assert_eq!(store.get("q2"), Some(&AnswerValue::Number(0.0)));
        assert_eq!(store.get("q3"), Some(&AnswerValue::Many(Vec::new())));
    }

    #[test]
    fn seed_initializes_new_ids_once_and_drops_removed() {
        let mut store = ValueStore::new();
        let mut fs = fields();
        store.seed(&fs);
        store.set_text("q1", "Ada");

        fs.push(FieldSchema::new("q4", "Date", FieldType::Date));
        fs.retain(|f| f.id != "q3");
        store.seed(&fs);

        // existing value untouched, new field initialized, removed field gone
        assert_eq!(store.get("q1"), Some(&AnswerValue::Text("Ada".into())));
        assert_eq!(store.get("q4"), Some(&AnswerValue::Text(String::new())));
        assert_eq!(store.get("q3"), None);
    }

    #[test]
    fn toggle_option_round_trip_restores_prior_entry() {
        let mut store = ValueStore::new();
        store.seed(&fields());
        store.toggle_option("q3", "dashboard");
        store.toggle_option("q3", "reporting");
        let before = store.get("q3").cloned();

        store.toggle_option("q3", "export");
        store.toggle_option("q3", "export");
        assert_eq!(store.get("q3").cloned(), before);
    }

    #[test]
    fn toggle_preserves_order_of_remaining_selections() {
        let mut store = ValueStore::new();
        store.seed(&fields());
        for v in ["a", "b", "c"] {
            store.toggle_option("q3", v);
        }
        store.toggle_option("q3", "b");
        assert_eq!(
            store.get("q3").and_then(|v| v.as_list()),
            Some(&["a".to_string(), "c".to_string()][..])
        );
    }

    #[test]
    fn coerce_number_handles_strings_and_blanks() {
        assert_eq!(AnswerValue::Text("42".into()).coerce_number(), Some(42.0));
        assert_eq!(AnswerValue::Text(" 3.5 ".into()).coerce_number(), Some(3.5));
        assert_eq!(AnswerValue::Text(String::new()).coerce_number(), None);
        assert_eq!(AnswerValue::Text("abc".into()).coerce_number(), None);
        assert_eq!(AnswerValue::Many(vec![]).coerce_number(), None);
    }
}
