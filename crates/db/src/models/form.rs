use chrono::{DateTime, Utc};
use forms::FieldSchema;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

/// A stored survey definition. `fields` holds the ordered field list as a
/// JSON document; use [`Form::parsed_fields`] for the typed view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Form {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub fields: String,
    pub is_anonymous: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Parse the stored field list. A malformed document yields an empty
    /// list rather than an error, so legacy rows keep rendering.
    pub fn parsed_fields(&self) -> Vec<FieldSchema> {
        match serde_json::from_str(&self.fields) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(form_id = %self.id, error = %e, "stored field list is malformed");
                Vec::new()
            }
        }
    }
}

/// Request body for creating a form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateForm {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Request body for updating a form; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FieldSchema>>,
    pub is_anonymous: Option<bool>,
}

const FORM_COLUMNS: &str =
    "id, title, description, fields, is_anonymous, created_by, created_at, updated_at";

impl Form {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateForm,
        created_by: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let fields_json = serde_json::to_string(&data.fields)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as::<_, Form>(&format!(
            "INSERT INTO forms (id, title, description, fields, is_anonymous, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(fields_json)
        .bind(data.is_anonymous)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Form>(&format!(
            "SELECT {FORM_COLUMNS} FROM forms WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Forms visible to a user: their own, plus ownerless ones.
    pub async fn find_by_creator(
        pool: &SqlitePool,
        created_by: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match created_by {
            Some(user_id) => {
                sqlx::query_as::<_, Form>(&format!(
                    "SELECT {FORM_COLUMNS} FROM forms
                     WHERE created_by = $1
                     ORDER BY created_at DESC"
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Form>(&format!(
                    "SELECT {FORM_COLUMNS} FROM forms
                     WHERE created_by IS NULL
                     ORDER BY created_at DESC"
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateForm,
    ) -> Result<Option<Self>, sqlx::Error> {
        let existing = match Self::find_by_id(pool, id).await? {
            Some(form) => form,
            None => return Ok(None),
        };

        let title = data.title.clone().unwrap_or(existing.title);
        let description = data.description.clone().or(existing.description);
        let fields_json = match &data.fields {
            Some(fields) => serde_json::to_string(fields)
                .map_err(|e| sqlx::Error::Protocol(e.to_string()))?,
            None => existing.fields,
        };
        let is_anonymous = data.is_anonymous.unwrap_or(existing.is_anonymous);

        sqlx::query_as::<_, Form>(&format!(
            "UPDATE forms
             SET title = $2, description = $3, fields = $4, is_anonymous = $5,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {FORM_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(fields_json)
        .bind(is_anonymous)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;
    use forms::{FieldSchema, FieldType};

    fn sample_create() -> CreateForm {
        CreateForm {
            title: "Customer Satisfaction".into(),
            description: Some("Q3 feedback".into()),
            fields: vec![
                FieldSchema::new("q1", "Satisfaction", FieldType::Rating).required(),
                FieldSchema::new("q2", "Comments", FieldType::Textarea),
            ],
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn create_and_round_trip_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        let form = Form::create(&db.pool, Uuid::new_v4(), &sample_create(), Some("user-1"))
            .await
            .unwrap();

        let parsed = form.parsed_fields();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, "q1");
        assert_eq!(parsed[0].field_type, FieldType::Rating);

        let found = Form::find_by_id(&db.pool, form.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Customer Satisfaction");
    }

    #[tokio::test]
    async fn listing_is_scoped_to_creator() {
        let db = DBService::new_in_memory().await.unwrap();
        Form::create(&db.pool, Uuid::new_v4(), &sample_create(), Some("alice"))
            .await
            .unwrap();
        Form::create(&db.pool, Uuid::new_v4(), &sample_create(), Some("bob"))
            .await
            .unwrap();

        let mine = Form::find_by_creator(&db.pool, Some("alice")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].created_by.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn update_replaces_only_given_parts() {
        let db = DBService::new_in_memory().await.unwrap();
        let form = Form::create(&db.pool, Uuid::new_v4(), &sample_create(), None)
            .await
            .unwrap();

        let updated = Form::update(
            &db.pool,
            form.id,
            &UpdateForm {
                title: Some("Renamed".into()),
                description: None,
                fields: None,
                is_anonymous: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("Q3 feedback"));
        assert_eq!(updated.parsed_fields().len(), 2);
    }

    #[tokio::test]
    async fn malformed_field_json_parses_to_empty_list() {
        let db = DBService::new_in_memory().await.unwrap();
        let form = Form::create(&db.pool, Uuid::new_v4(), &sample_create(), None)
            .await
            .unwrap();
        sqlx::query("UPDATE forms SET fields = 'not-json' WHERE id = $1")
            .bind(form.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let reloaded = Form::find_by_id(&db.pool, form.id).await.unwrap().unwrap();
        assert!(reloaded.parsed_fields().is_empty());
    }
}
