use thiserror::Error;

use crate::schema::FieldSchema;
use crate::store::{Answers, ValueStore};
use crate::validate::{FieldError, Ruleset, compile};
use crate::widget::{WidgetBinding, widgets};

/// Why a submission was not produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// A previous submission has not settled yet; the triggering control is
    /// disabled until `resolve` is called.
    #[error("a submission is already in flight")]
    InFlight,
    /// One or more fields failed validation; the store is left untouched.
    #[error("validation failed for {} field(s)", .0.len())]
    Invalid(Vec<FieldError>),
}

/// A fully validated answer map, ready for the persistence collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub form_id: String,
    pub answers: Answers,
}

/// Live state of one form being filled in: the current field list, the
/// ruleset compiled from it, and the value store the widgets bind to.
#[derive(Debug, Clone)]
pub struct FormSession {
    form_id: String,
    fields: Vec<FieldSchema>,
    ruleset: Ruleset,
    store: ValueStore,
    in_flight: bool,
}

impl FormSession {
    pub fn new(form_id: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        let mut store = ValueStore::new();
        store.reset(&fields);
        Self {
            form_id: form_id.into(),
            ruleset: compile(&fields),
            fields,
            store,
            in_flight: false,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Swap in a (possibly edited) field list, recompiling the ruleset.
    ///
    /// Moving to a different form reinitializes the whole store; editing the
    /// current form's field list initializes only new field ids and drops
    /// removed ones, keeping values already entered.
    pub fn set_schema(&mut self, form_id: impl Into<String>, fields: Vec<FieldSchema>) {
        let form_id = form_id.into();
        if form_id != self.form_id {
            self.form_id = form_id;
            self.store.reset(&fields);
        } else {
            self.store.seed(&fields);
        }
        self.ruleset = compile(&fields);
        self.fields = fields;
    }

    /// Widget descriptors for the current field list, in order.
    pub fn widgets(&self) -> Vec<WidgetBinding> {
        widgets(&self.fields)
    }

    /// Current inline validation state.
    pub fn errors(&self) -> Vec<FieldError> {
        self.ruleset.check(&self.store)
    }

    // Value writes touch only the named field's entry; the ruleset is not
    // recompiled (it depends on the field list alone).

    pub fn set_text(&mut self, field_id: &str, value: impl Into<String>) {
        self.store.set_text(field_id, value);
    }

    pub fn set_rating(&mut self, field_id: &str, position: u32) {
        self.store.set_rating(field_id, position);
    }

    pub fn toggle_option(&mut self, field_id: &str, option_value: &str) {
        self.store.toggle_option(field_id, option_value);
    }

    /// Assemble the store into a flat answer map: all fields must pass the
    /// compiled ruleset or nothing is submitted. On success the in-flight
    /// flag blocks further submissions until `resolve` is called.
    pub fn submit(&mut self) -> Result<Submission, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }
        let errors = self.ruleset.check(&self.store);
        if !errors.is_empty() {
            return Err(SubmitError::Invalid(errors));
        }
        let answers: Answers = self
            .fields
            .iter()
            .filter_map(|field| {
                self.store
                    .get(&field.id)
                    .map(|value| (field.id.clone(), value.clone()))
            })
            .collect();
        self.in_flight = true;
        Ok(Submission {
            form_id: self.form_id.clone(),
            answers,
        })
    }

    /// Settle the outstanding submission. Acceptance clears the store back
    /// to the initial value policy; a transport failure leaves every value
    /// intact so the user can retry without retyping.
    pub fn resolve(&mut self, accepted: bool) {
        self.in_flight = false;
        if accepted {
            self.store.reset(&self.fields);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldOption, FieldType};
    use crate::store::AnswerValue;

    fn session() -> FormSession {
        FormSession::new(
            "form-1",
            vec![
                FieldSchema::new("q1", "Name", FieldType::Text).required(),
                FieldSchema::new("q2", "Features", FieldType::Checkbox).with_options(vec![
                    FieldOption::new("Dashboard", "dashboard"),
                    FieldOption::new("Reporting", "reporting"),
                ]),
            ],
        )
    }

    #[test]
    fn switching_forms_reinitializes_the_store() {
        let mut s = session();
        s.set_text("q1", "Ada");
        s.set_schema(
            "form-2",
            vec![FieldSchema::new("q1", "Name", FieldType::Text)],
        );
        assert_eq!(s.store().get("q1"), Some(&AnswerValue::Text(String::new())));
    }

    #[test]
    fn editing_fields_keeps_entered_values_and_recompiles() {
        let mut s = session();
        s.set_text("q1", "Ada");
        let mut fields = s.fields().to_vec();
        fields.push(FieldSchema::new("q3", "Mail", FieldType::Email).required());
        s.set_schema("form-1", fields);

        assert_eq!(s.store().get("q1"), Some(&AnswerValue::Text("Ada".into())));
        assert_eq!(s.ruleset().rules().len(), 3);
    }

    #[test]
    fn submit_is_blocked_while_in_flight() {
        let mut s = session();
        s.set_text("q1", "Ada");
        s.submit().expect("first submission");
        assert_eq!(s.submit(), Err(SubmitError::InFlight));
        s.resolve(false);
        assert!(s.submit().is_ok());
    }

    #[test]
    fn acceptance_clears_transport_failure_preserves() {
        let mut s = session();
        s.set_text("q1", "Ada");
        s.toggle_option("q2", "dashboard");

        s.submit().expect("valid");
        s.resolve(false);
        assert_eq!(s.store().get("q1"), Some(&AnswerValue::Text("Ada".into())));

        s.submit().expect("valid again");
        s.resolve(true);
        assert_eq!(s.store().get("q1"), Some(&AnswerValue::Text(String::new())));
        assert_eq!(s.store().get("q2"), Some(&AnswerValue::Many(Vec::new())));
    }
}
