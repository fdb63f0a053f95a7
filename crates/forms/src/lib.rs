//! Dynamic form engine: declarative field schemas compiled into validation
//! rulesets, widget descriptors bound to a typed value store, and the
//! all-or-nothing response assembler.

pub mod schema;
pub mod session;
pub mod store;
pub mod validate;
pub mod widget;

pub use schema::{
    DefinitionError, FieldOption, FieldSchema, FieldType, derive_option_value, validate_definition,
};
pub use session::{FormSession, SubmitError, Submission};
pub use store::{Answers, AnswerValue, ValueStore};
pub use validate::{FieldError, Rule, Ruleset, compile};
pub use widget::{Widget, WidgetBinding, widgets};
