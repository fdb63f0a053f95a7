use chrono::{DateTime, Utc};
use forms::Answers;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

/// One respondent's submitted answers, immutable once created. `answers`
/// holds the flat field-id → value map as a JSON document.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub form_id: Uuid,
    pub answers: String,
    pub submitted_at: DateTime<Utc>,
}

impl ResponseRecord {
    /// Parse the stored answer map; malformed documents yield an empty map.
    pub fn parsed_answers(&self) -> Answers {
        match serde_json::from_str(&self.answers) {
            Ok(answers) => answers,
            Err(e) => {
                warn!(response_id = %self.id, error = %e, "stored answers are malformed");
                Answers::new()
            }
        }
    }
}

/// Request body for submitting a response.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateResponse {
    pub answers: Answers,
}

const RESPONSE_COLUMNS: &str = "id, form_id, answers, submitted_at";

impl ResponseRecord {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        form_id: Uuid,
        answers: &Answers,
    ) -> Result<Self, sqlx::Error> {
        let answers_json =
            serde_json::to_string(answers).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as::<_, ResponseRecord>(&format!(
            "INSERT INTO responses (id, form_id, answers)
             VALUES ($1, $2, $3)
             RETURNING {RESPONSE_COLUMNS}"
        ))
        .bind(id)
        .bind(form_id)
        .bind(answers_json)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_form_id(
        pool: &SqlitePool,
        form_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ResponseRecord>(&format!(
            "SELECT {RESPONSE_COLUMNS} FROM responses
             WHERE form_id = $1
             ORDER BY submitted_at ASC"
        ))
        .bind(form_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_form_id(pool: &SqlitePool, form_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM responses WHERE form_id = $1")
            .bind(form_id)
            .fetch_one(pool)
            .await
    }
}
