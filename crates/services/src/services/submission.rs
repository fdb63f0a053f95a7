//! Validate-then-persist pipeline for incoming responses.

use std::sync::Arc;

use db::models::{form::Form, response::ResponseRecord};
use forms::{Answers, FieldError, ValueStore, compile};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::live::ResponseBroadcaster;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("form not found")]
    FormNotFound,
    #[error("validation failed for {} field(s)", .0.len())]
    Invalid(Vec<FieldError>),
}

/// Accepts an assembled answer map for a form, validates it against the
/// form's current field list, and persists it as an immutable record. No
/// partial submission: one failing field rejects the whole map.
pub struct SubmissionService {
    pool: SqlitePool,
    live: Arc<ResponseBroadcaster>,
}

impl SubmissionService {
    pub fn new(pool: SqlitePool, live: Arc<ResponseBroadcaster>) -> Self {
        Self { pool, live }
    }

    pub async fn submit(
        &self,
        form_id: Uuid,
        answers: Answers,
    ) -> Result<ResponseRecord, SubmissionError> {
        let form = Form::find_by_id(&self.pool, form_id)
            .await?
            .ok_or(SubmissionError::FormNotFound)?;

        // The ruleset is a pure function of the current field list, so it is
        // compiled fresh here rather than cached across schema edits.
        let fields = form.parsed_fields();
        let ruleset = compile(&fields);
        let errors = ruleset.check(&ValueStore::from_answers(&answers));
        if !errors.is_empty() {
            return Err(SubmissionError::Invalid(errors));
        }

        // Answers persist verbatim; keys for since-deleted fields are kept
        // as-is (legacy behavior, not reconciled).
        let record = ResponseRecord::create(&self.pool, Uuid::new_v4(), form_id, &answers).await?;
        info!(form_id = %form_id, response_id = %record.id, "response recorded");
        self.live.publish(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::DBService;
    use db::models::form::CreateForm;
    use forms::{AnswerValue, FieldSchema, FieldType};

    async fn service_with_form() -> (SubmissionService, DBService, Uuid) {
        let db = DBService::new_in_memory().await.unwrap();
        let form = Form::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateForm {
                title: "Survey".into(),
                description: None,
                fields: vec![
                    FieldSchema::new("q1", "Score", FieldType::Rating).required(),
                    FieldSchema::new("q2", "Comments", FieldType::Textarea),
                ],
                is_anonymous: true,
            },
            None,
        )
        .await
        .unwrap();
        let service = SubmissionService::new(db.pool.clone(), Arc::new(ResponseBroadcaster::new()));
        (service, db, form.id)
    }

    #[tokio::test]
    async fn invalid_answers_are_rejected_and_not_persisted() {
        let (service, db, form_id) = service_with_form().await;

        let mut answers = Answers::new();
        answers.insert("q1".into(), AnswerValue::Number(0.0));
        answers.insert("q2".into(), AnswerValue::Text(String::new()));

        let err = service.submit(form_id, answers).await.unwrap_err();
        match err {
            SubmissionError::Invalid(errors) => assert_eq!(errors[0].field_id, "q1"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            ResponseRecord::count_by_form_id(&db.pool, form_id).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn valid_answers_are_persisted_verbatim() {
        let (service, db, form_id) = service_with_form().await;

        let mut answers = Answers::new();
        answers.insert("q1".into(), AnswerValue::Number(4.0));
        answers.insert("q2".into(), AnswerValue::Text(String::new()));

        let record = service.submit(form_id, answers.clone()).await.unwrap();
        assert_eq!(record.parsed_answers(), answers);

        let stored = ResponseRecord::find_by_form_id(&db.pool, form_id).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn stale_answer_keys_persist_untouched() {
        let (service, _db, form_id) = service_with_form().await;

        let mut answers = Answers::new();
        answers.insert("q1".into(), AnswerValue::Number(5.0));
        answers.insert("q_removed".into(), AnswerValue::Text("old".into()));

        let record = service.submit(form_id, answers).await.unwrap();
        assert!(record.parsed_answers().contains_key("q_removed"));
    }

    #[tokio::test]
    async fn unknown_form_is_reported_not_found() {
        let (service, _db, _form_id) = service_with_form().await;
        let err = service.submit(Uuid::new_v4(), Answers::new()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::FormNotFound));
    }
}
