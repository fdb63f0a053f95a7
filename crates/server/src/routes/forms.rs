//! CRUD routes for form definitions (the builder's persistence surface).

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::form::{CreateForm, Form, UpdateForm};
use deployment::Deployment;
use forms::{FieldOption, FieldSchema, WidgetBinding, validate_definition, widgets};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, auth::CurrentUser, error::ApiError};

/// What a respondent needs to render the form: metadata plus one widget
/// descriptor per field, in display order.
#[derive(Debug, Clone, Serialize, TS)]
pub struct FormView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_anonymous: bool,
    pub widgets: Vec<WidgetBinding>,
}

/// Fill in option values the builder left blank, the way the builder UI
/// derives them from labels on blur.
fn normalize_fields(fields: &mut [FieldSchema]) {
    for field in fields {
        field.options = std::mem::take(&mut field.options)
            .into_iter()
            .map(FieldOption::ensure_value)
            .collect();
    }
}

/// POST /api/forms
pub async fn create_form(
    State(deployment): State<DeploymentImpl>,
    user: CurrentUser,
    axum::Json(mut payload): axum::Json<CreateForm>,
) -> Result<ResponseJson<ApiResponse<Form>>, ApiError> {
    normalize_fields(&mut payload.fields);
    validate_definition(&payload.title, &payload.fields)?;

    let form = Form::create(&deployment.db().pool, Uuid::new_v4(), &payload, user.id()).await?;
    Ok(ResponseJson(ApiResponse::success(form)))
}

/// GET /api/forms
pub async fn list_forms(
    State(deployment): State<DeploymentImpl>,
    user: CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<Form>>>, ApiError> {
    let forms = Form::find_by_creator(&deployment.db().pool, user.id()).await?;
    Ok(ResponseJson(ApiResponse::success(forms)))
}

/// GET /api/forms/{form_id}
pub async fn get_form(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Form>>, ApiError> {
    let form = Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(form)))
}

/// PUT /api/forms/{form_id}
pub async fn update_form(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
    axum::Json(mut payload): axum::Json<UpdateForm>,
) -> Result<ResponseJson<ApiResponse<Form>>, ApiError> {
    let existing = Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(fields) = payload.fields.as_mut() {
        normalize_fields(fields);
    }
    // The edited definition must satisfy the same invariants as a new one.
    let title = payload.title.as_deref().unwrap_or(&existing.title);
    let fields = payload
        .fields
        .clone()
        .unwrap_or_else(|| existing.parsed_fields());
    validate_definition(title, &fields)?;

    let form = Form::update(&deployment.db().pool, form_id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(form)))
}

/// GET /api/forms/{form_id}/view
///
/// Public respondent view of a form.
pub async fn get_form_view(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<FormView>>, ApiError> {
    let form = Form::find_by_id(&deployment.db().pool, form_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let view = FormView {
        id: form.id,
        title: form.title.clone(),
        description: form.description.clone(),
        is_anonymous: form.is_anonymous,
        widgets: widgets(&form.parsed_fields()),
    };
    Ok(ResponseJson(ApiResponse::success(view)))
}

/// DELETE /api/forms/{form_id}
pub async fn delete_form(
    State(deployment): State<DeploymentImpl>,
    Path(form_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Form::delete(&deployment.db().pool, form_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/forms",
        Router::new()
            .route("/", get(list_forms).post(create_form))
            .route(
                "/{form_id}",
                get(get_form).put(update_form).delete(delete_form),
            )
            .route("/{form_id}/view", get(get_form_view)),
    )
}
