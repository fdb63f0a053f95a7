//! AI endpoints: question suggestion for the builder and feedback
//! summarization for the results page.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::post,
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::{
    feedback_summarizer::FeedbackSummarizer,
    question_generator::{QuestionGenerator, SuggestedQuestion},
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GenerateQuestionsRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SummaryResponse {
    pub summary: String,
}

/// POST /api/ai/question-suggestions
pub async fn suggest_questions(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<GenerateQuestionsRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<SuggestedQuestion>>>, ApiError> {
    let claude = deployment.claude().ok_or(ApiError::AiUnavailable)?.clone();
    let questions = QuestionGenerator::new(claude).generate(&payload.topic).await?;
    Ok(ResponseJson(ApiResponse::success(questions)))
}

/// POST /api/forms/{form_id}/summarize
pub async fn summarize_feedback(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<SummaryResponse>>, ApiError> {
    let claude = deployment.claude().ok_or(ApiError::AiUnavailable)?.clone();
    let summarizer = FeedbackSummarizer::new(deployment.db().pool.clone(), claude);
    let summary = summarizer.summarize_form(form_id).await?;
    Ok(ResponseJson(ApiResponse::success(SummaryResponse { summary })))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/ai/question-suggestions", post(suggest_questions))
        .route("/forms/{form_id}/summarize", post(summarize_feedback))
}
