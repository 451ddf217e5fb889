//! Event CRUD endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::{CreateEventRequest, Event, UpdateEventRequest};
use crate::error::AppError;
use crate::server::AppState;
use crate::store::Page;

use super::ListQuery;

/// POST /api/v1/events - Register a new event under an application
#[tracing::instrument(name = "http.create_event", skip(state, request))]
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/v1/events?application={id} - Paginated listing per application
#[tracing::instrument(name = "http.list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Event>>, AppError> {
    let application = query.application.ok_or_else(|| {
        AppError::Validation("\"application\" (application ID) is required".to_string())
    })?;
    let params = query.into_params(state.settings.pagination.default_page_size);
    let page = state.events.list(application, params).await?;
    Ok(Json(page))
}

/// GET /api/v1/events/{id}
#[tracing::instrument(name = "http.get_event", skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.get(id).await?))
}

/// PUT /api/v1/events/{id} - Partial update
#[tracing::instrument(name = "http.update_event", skip(state, request))]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.update(id, request).await?))
}

/// DELETE /api/v1/events/{id} - Soft delete with cascade
#[tracing::instrument(name = "http.delete_event", skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.delete(id).await?))
}
