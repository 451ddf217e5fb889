//! Message composition pipeline.
//!
//! A message may only be composed while the whole ownership chain
//! (notification type → event → application) is live. Soft deletes keep
//! references intact, so a missing ancestor can only mean corrupted data
//! and is reported as an integrity fault, not a caller error.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ComposeMessageRequest, Message};
use crate::error::{AppError, Result};
use crate::store::DataStore;
use crate::template::render;

pub struct MessageService {
    store: Arc<dyn DataStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Compose and persist a message from a notification type.
    ///
    /// Precondition ladder, each step failing fast:
    /// 1. notification_type id and recipient present in the request
    /// 2. notification type exists (deleted counts as missing) and is active
    /// 3. owning event exists (else integrity fault) and is active
    /// 4. owning application exists (else integrity fault) and is active
    /// 5. metadata satisfies the declared tags; template renders
    pub async fn compose(&self, request: ComposeMessageRequest) -> Result<Message> {
        let notification_type_id = request.validate()?;

        let notification_type = self
            .store
            .find_notification_type(notification_type_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation(
                    "The notification type with the given ID was not found.".to_string(),
                )
            })?;
        if !notification_type.state.is_active() {
            return Err(AppError::Validation(
                "The notification type is inactive.".to_string(),
            ));
        }

        let event = self
            .store
            .find_event(notification_type.event)
            .await?
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "Unknown event with ID: {} found in notification type: {}",
                    notification_type.event, notification_type.id
                ))
            })?;
        if !event.state.is_active() {
            return Err(AppError::Validation(
                "The event for this notification type is inactive.".to_string(),
            ));
        }

        let application = self
            .store
            .find_application(event.application)
            .await?
            .ok_or_else(|| {
                AppError::Integrity(format!(
                    "Unknown application with ID: {} found. [event: {}, notification type: {}]",
                    event.application, event.id, notification_type.id
                ))
            })?;
        if !application.state.is_active() {
            return Err(AppError::Validation(
                "The application for this notification type is inactive.".to_string(),
            ));
        }

        let rendered = render(
            &notification_type.template_subject,
            &notification_type.template_body,
            &notification_type.tags,
            &request.metadata,
        )?;

        let message = self
            .store
            .insert_message(Message::new(
                rendered.subject,
                rendered.body,
                request.email,
                notification_type.id,
            ))
            .await?;

        tracing::info!(
            message_id = %message.id,
            notification_type_id = %notification_type.id,
            email = %message.email,
            "Message composed"
        );

        Ok(message)
    }

    pub async fn get(&self, id: Uuid) -> Result<Message> {
        self.store
            .find_message(id)
            .await?
            .ok_or_else(|| AppError::NotFound("The message with the given ID was not found.".to_string()))
    }
}
