//! NotificationType CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::{
    CreateNotificationTypeRequest, NotificationType, UpdateNotificationTypeRequest,
};
use crate::error::AppError;
use crate::server::AppState;
use crate::store::Page;

use super::{BulkDeleteRequest, ListQuery};

/// POST /api/v1/notification-types - Register a new template under an event
#[tracing::instrument(name = "http.create_notification_type", skip(state, request))]
pub async fn create_notification_type(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationTypeRequest>,
) -> Result<(StatusCode, Json<NotificationType>), AppError> {
    let notification_type = state.notification_types.create(request).await?;
    Ok((StatusCode::CREATED, Json(notification_type)))
}

/// GET /api/v1/notification-types?event={id} - Paginated listing per event
#[tracing::instrument(name = "http.list_notification_types", skip(state))]
pub async fn list_notification_types(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<NotificationType>>, AppError> {
    let event = query
        .event
        .ok_or_else(|| AppError::Validation("\"event\" (event ID) is required".to_string()))?;
    let params = query.into_params(state.settings.pagination.default_page_size);
    let page = state.notification_types.list(event, params).await?;
    Ok(Json(page))
}

/// GET /api/v1/notification-types/{id}
#[tracing::instrument(name = "http.get_notification_type", skip(state))]
pub async fn get_notification_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationType>, AppError> {
    Ok(Json(state.notification_types.get(id).await?))
}

/// PUT /api/v1/notification-types/{id} - Partial update; a new body
/// recomputes the stored tags
#[tracing::instrument(name = "http.update_notification_type", skip(state, request))]
pub async fn update_notification_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateNotificationTypeRequest>,
) -> Result<Json<NotificationType>, AppError> {
    Ok(Json(state.notification_types.update(id, request).await?))
}

/// DELETE /api/v1/notification-types/{id} - Soft delete
#[tracing::instrument(name = "http.delete_notification_type", skip(state))]
pub async fn delete_notification_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationType>, AppError> {
    Ok(Json(state.notification_types.delete(id).await?))
}

/// DELETE /api/v1/notification-types - Bulk soft delete
#[tracing::instrument(name = "http.delete_notification_types", skip(state, request))]
pub async fn delete_notification_types(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<Vec<NotificationType>>, AppError> {
    request.validate()?;
    Ok(Json(
        state.notification_types.delete_many(&request.ids).await?,
    ))
}
