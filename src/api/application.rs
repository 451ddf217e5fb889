//! Application CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::{Application, CreateApplicationRequest, UpdateApplicationRequest};
use crate::error::AppError;
use crate::server::AppState;
use crate::store::Page;

use super::{BulkDeleteRequest, ListQuery};

/// POST /api/v1/applications - Register a new application
#[tracing::instrument(name = "http.create_application", skip(state, request))]
pub async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let app = state.applications.create(request).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /api/v1/applications - Paginated listing
#[tracing::instrument(name = "http.list_applications", skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Application>>, AppError> {
    let params = query.into_params(state.settings.pagination.default_page_size);
    let page = state.applications.list(params).await?;
    Ok(Json(page))
}

/// GET /api/v1/applications/{id}
#[tracing::instrument(name = "http.get_application", skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(state.applications.get(id).await?))
}

/// PUT /api/v1/applications/{id} - Partial update
#[tracing::instrument(name = "http.update_application", skip(state, request))]
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(state.applications.update(id, request).await?))
}

/// DELETE /api/v1/applications/{id} - Soft delete with cascade
#[tracing::instrument(name = "http.delete_application", skip(state))]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(state.applications.delete(id).await?))
}

/// DELETE /api/v1/applications - Bulk soft delete with cascade per id
#[tracing::instrument(name = "http.delete_applications", skip(state, request))]
pub async fn delete_applications(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<Vec<Application>>, AppError> {
    request.validate()?;
    Ok(Json(state.applications.delete_many(&request.ids).await?))
}
