//! Response collection: submission, listing, the live SSE query and CSV
//! export.

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{
        Json as ResponseJson,
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
};
use db::models::{
    form::Form,
    response::{CreateResponse, ResponseRecord},
};
use deployment::Deployment;
use futures_util::{Stream, StreamExt};
use services::services::{export::responses_to_csv, submission::SubmissionService};
use tokio_stream::wrappers::BroadcastStream;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// POST /api/forms/{form_id}/responses
///
/// Validates the assembled answer map against the form's current field list;
/// one failing field rejects the whole submission and nothing is persisted.
pub async fn submit_response(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateResponse>,
) -> Result<ResponseJson<ApiResponse<ResponseRecord>>, ApiError> {
    let service = SubmissionService::new(deployment.db().pool.clone(), deployment.live().clone());
    let record = service.submit(form_id, payload.answers).await?;
    Ok(ResponseJson(ApiResponse::success(record)))
}

/// GET /api/forms/{form_id}/responses
pub async fn list_responses(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ResponseRecord>>>, ApiError> {
    Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let responses = ResponseRecord::find_by_form_id(&deployment.db().pool, form_id).await?;
    Ok(ResponseJson(ApiResponse::success(responses)))
}

/// GET /api/forms/{form_id}/responses/stream
///
/// Live query: pushes every new response for the form as an SSE event.
pub async fn stream_responses(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let receiver = deployment.live().subscribe(form_id);
    let stream = BroadcastStream::new(receiver)
        .filter_map(|record| async move { record.ok() })
        .filter_map(|record| async move {
            Event::default().event("response").json_data(&record).ok()
        })
        .map(Ok);

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/forms/{form_id}/responses/export
pub async fn export_responses(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let form = Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let responses = ResponseRecord::find_by_form_id(&deployment.db().pool, form_id).await?;
    let csv = responses_to_csv(&form, &responses)?;

    let filename = format!("attachment; filename=\"form-{form_id}-responses.csv\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    )
        .into_response())
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/forms/{form_id}/responses",
        Router::new()
            .route("/", post(submit_response).get(list_responses))
            .route("/stream", get(stream_responses))
            .route("/export", get(export_responses)),
    )
}
