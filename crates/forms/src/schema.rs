use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;

/// Input type of a single form field.
///
/// Unrecognized tags deserialize to `Unknown` rather than failing, so a
/// legacy or malformed schema still renders and validates (as an
/// unconstrained optional field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, EnumString, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Rating,
    Nps,
    Date,
    Email,
    Number,
    Unknown,
}

impl FieldType {
    /// Types that carry an option list.
    pub fn requires_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    /// Parse a stored type tag, falling back to `Unknown` for anything
    /// unrecognized instead of rejecting the schema.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "rating" => Self::Rating,
            "nps" => Self::Nps,
            "date" => Self::Date,
            "email" => Self::Email,
            "number" => Self::Number,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// One selectable choice of a select/radio/checkbox field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Build an option whose value is derived from its label.
    pub fn from_label(label: impl Into<String>) -> Self {
        let label = label.into();
        let value = derive_option_value(&label);
        Self { label, value }
    }

    /// Fill in a missing value from the label, leaving explicit values alone.
    pub fn ensure_value(mut self) -> Self {
        if self.value.is_empty() {
            self.value = derive_option_value(&self.label);
        }
        self
    }
}

/// Derive an option value from its label: lowercase, whitespace runs become
/// a single `-`, everything outside `[a-z0-9-]` is dropped.
pub fn derive_option_value(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            in_space = false;
            if ch.is_ascii_alphanumeric() || ch == '-' {
                out.push(ch);
            }
        }
    }
    out
}

/// Declarative description of one question in a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct FieldSchema {
    /// Unique within the form.
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present only for select/radio/checkbox fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<i32>,
}

impl FieldSchema {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            placeholder: None,
            description: None,
            options: Vec::new(),
            min_rating: None,
            max_rating: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    /// Scale ceiling for rating widgets. NPS is a fixed 0-10 scale.
    pub fn max_rating_or_default(&self) -> u32 {
        match self.field_type {
            FieldType::Nps => 10,
            _ => self.max_rating.map_or(5, |m| m.max(1) as u32),
        }
    }
}

/// Violation of a form definition invariant, raised when a form is created
/// or edited through the builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("form title must not be empty")]
    EmptyTitle,
    #[error("form must contain at least one field")]
    NoFields,
    #[error("duplicate field id: {0}")]
    DuplicateFieldId(String),
    #[error("field '{0}' requires a non-empty option list")]
    MissingOptions(String),
    #[error("field '{field}' has duplicate option value '{value}'")]
    DuplicateOptionValue { field: String, value: String },
    #[error("field '{0}' has min_rating greater than max_rating")]
    RatingBoundsInverted(String),
}

/// Check the invariants of a full form definition: non-empty title, at least
/// one field, unique field ids, non-empty unique options where the type
/// demands them, and ordered rating bounds.
pub fn validate_definition(title: &str, fields: &[FieldSchema]) -> Result<(), DefinitionError> {
    if title.trim().is_empty() {
        return Err(DefinitionError::EmptyTitle);
    }
    if fields.is_empty() {
        return Err(DefinitionError::NoFields);
    }

    let mut seen_ids = std::collections::HashSet::new();
    for field in fields {
        if !seen_ids.insert(field.id.as_str()) {
            return Err(DefinitionError::DuplicateFieldId(field.id.clone()));
        }
        if field.field_type.requires_options() {
            if field.options.is_empty() {
                return Err(DefinitionError::MissingOptions(field.id.clone()));
            }
            let mut seen_values = std::collections::HashSet::new();
            for option in &field.options {
                if !seen_values.insert(option.value.as_str()) {
                    return Err(DefinitionError::DuplicateOptionValue {
                        field: field.id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (field.min_rating, field.max_rating) {
            if min > max {
                return Err(DefinitionError::RatingBoundsInverted(field.id.clone()));
            }
        }
    }
    Ok(())
}
