use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forms::{DefinitionError, FieldError};
use services::services::{
    claude_api::ClaudeApiError,
    export::ExportError,
    feedback_summarizer::SummarizerError,
    question_generator::QuestionGeneratorError,
    submission::SubmissionError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// Server-level error taxonomy: validation failures block the one request,
/// transport failures abandon the operation for manual retry, and nothing
/// here is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("AI request failed: {0}")]
    ClaudeApi(#[from] ClaudeApiError),
    #[error("AI features are not configured")]
    AiUnavailable,
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::FormNotFound => Self::NotFound,
            SubmissionError::Invalid(errors) => Self::Validation(errors),
            SubmissionError::Database(e) => Self::Database(e),
        }
    }
}

impl From<SummarizerError> for ApiError {
    fn from(err: SummarizerError) -> Self {
        match err {
            SummarizerError::FormNotFound => Self::NotFound,
            SummarizerError::NoTextFeedback => {
                Self::BadRequest("no textual feedback to summarize".to_string())
            }
            SummarizerError::Database(e) => Self::Database(e),
            SummarizerError::ClaudeApi(e) => Self::ClaudeApi(e),
        }
    }
}

impl From<QuestionGeneratorError> for ApiError {
    fn from(err: QuestionGeneratorError) -> Self {
        match err {
            QuestionGeneratorError::EmptyTopic => {
                Self::BadRequest("topic must not be empty".to_string())
            }
            QuestionGeneratorError::ClaudeApi(e) => Self::ClaudeApi(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Definition(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ClaudeApi(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body: ApiResponse<(), Vec<FieldError>> = match self {
            Self::Validation(errors) => {
                ApiResponse::error_with_data("validation failed", errors)
            }
            other => ApiResponse::error(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
