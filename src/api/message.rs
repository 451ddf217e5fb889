//! Message endpoints. Messages are composed once and never mutated.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::domain::{ComposeMessageRequest, Message};
use crate::error::AppError;
use crate::server::AppState;

/// POST /api/v1/messages - Compose a message from a notification type
#[tracing::instrument(name = "http.create_message", skip(state, request))]
pub async fn create_message(
    State(state): State<AppState>,
    Json(request): Json<ComposeMessageRequest>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = state.messages.compose(request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/v1/messages/{id}
#[tracing::instrument(name = "http.get_message", skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    Ok(Json(state.messages.get(id).await?))
}
