//! Aggregated results for the dashboard.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{form::Form, response::ResponseRecord};
use deployment::Deployment;
use services::services::results::{FormResults, aggregate};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// GET /api/forms/{form_id}/results
pub async fn get_results(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FormResults>>, ApiError> {
    let form = Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let responses = ResponseRecord::find_by_form_id(&deployment.db().pool, form_id).await?;

    let results = aggregate(&form.parsed_fields(), &responses);
    Ok(ResponseJson(ApiResponse::success(results)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/forms/{form_id}/results", get(get_results))
}
