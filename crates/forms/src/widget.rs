use serde::Serialize;
use ts_rs::TS;

use crate::schema::{FieldOption, FieldSchema, FieldType};

/// Typed descriptor of the input control a client should draw for a field.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    TextInput { placeholder: Option<String> },
    TextArea { placeholder: Option<String> },
    EmailInput { placeholder: Option<String> },
    NumberInput { placeholder: Option<String> },
    DateInput,
    SelectMenu {
        placeholder: Option<String>,
        options: Vec<FieldOption>,
    },
    RadioGroup { options: Vec<FieldOption> },
    CheckboxGroup { options: Vec<FieldOption> },
    StarRating { max: u32 },
    NpsScale,
}

impl Widget {
    /// Cumulative star fill: a position renders filled iff the current
    /// value reaches its 1-based ordinal, not only the selected position.
    pub fn star_filled(current: f64, position: u32) -> bool {
        current >= position as f64
    }

    /// The eleven NPS buttons, one per integer.
    pub fn nps_points() -> impl Iterator<Item = u32> {
        0..=10
    }
}

/// One widget bound to its field id in the value store.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
pub struct WidgetBinding {
    pub field_id: String,
    pub label: String,
    pub description: Option<String>,
    pub required: bool,
    pub widget: Widget,
}

/// Instantiate one widget per field, in list order, selected by the field's
/// type. Unknown types fall back to a plain text input so a malformed
/// schema still renders.
pub fn widgets(fields: &[FieldSchema]) -> Vec<WidgetBinding> {
    fields
        .iter()
        .map(|field| {
            let widget = match field.field_type {
                FieldType::Text | FieldType::Unknown => Widget::TextInput {
                    placeholder: field.placeholder.clone(),
                },
                FieldType::Textarea => Widget::TextArea {
                    placeholder: field.placeholder.clone(),
                },
                FieldType::Email => Widget::EmailInput {
                    placeholder: field.placeholder.clone(),
                },
                FieldType::Number => Widget::NumberInput {
                    placeholder: field.placeholder.clone(),
                },
                FieldType::Date => Widget::DateInput,
                FieldType::Select => Widget::SelectMenu {
                    placeholder: field.placeholder.clone(),
                    options: field.options.clone(),
                },
                FieldType::Radio => Widget::RadioGroup {
                    options: field.options.clone(),
                },
                FieldType::Checkbox => Widget::CheckboxGroup {
                    options: field.options.clone(),
                },
                FieldType::Rating => Widget::StarRating {
                    max: field.max_rating_or_default(),
                },
                FieldType::Nps => Widget::NpsScale,
            };
            WidgetBinding {
                field_id: field.id.clone(),
                label: field.label.clone(),
                description: field.description.clone(),
                required: field.required,
                widget,
            }
        })
        .collect()
}
