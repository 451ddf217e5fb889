//! NotificationType CRUD. Tags are derived from the body template on
//! create and recomputed whenever an update changes it.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    CreateNotificationTypeRequest, NotificationType, UpdateNotificationTypeRequest,
};
use crate::error::{AppError, Result};
use crate::store::{DataStore, NotificationTypePatch, Page};
use crate::template::extract_tags;

use super::ListParams;

const NOT_FOUND: &str = "The notification type with the given ID was not found.";

pub struct NotificationTypeService {
    store: Arc<dyn DataStore>,
}

impl NotificationTypeService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateNotificationTypeRequest) -> Result<NotificationType> {
        let event_id = request.validate()?;

        let event = self.store.find_event(event_id).await?.ok_or_else(|| {
            AppError::Validation("The event with the given ID was not found.".to_string())
        })?;
        if !event.state.is_active() {
            return Err(AppError::Validation(
                "The event with the given ID is inactive.".to_string(),
            ));
        }

        let notification_type = self
            .store
            .insert_notification_type(request.into_notification_type(event_id))
            .await?;

        tracing::info!(
            notification_type_id = %notification_type.id,
            event_id = %event_id,
            name = %notification_type.name,
            tags = ?notification_type.tags,
            "Notification type created"
        );
        Ok(notification_type)
    }

    pub async fn get(&self, id: Uuid) -> Result<NotificationType> {
        self.store
            .find_notification_type(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// List notification types under one event.
    pub async fn list(&self, event: Uuid, params: ListParams) -> Result<Page<NotificationType>> {
        let (filter, sort, page) = params.parts(Some(event));

        let total = self.store.count_notification_types(&filter).await?;
        let (current_page, last_page, window) = page.resolve(total);
        let items = self
            .store
            .list_notification_types(&filter, sort, window)
            .await?;

        Ok(Page {
            current_page,
            last_page,
            total,
            items,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateNotificationTypeRequest,
    ) -> Result<NotificationType> {
        request.validate()?;
        let current = self.get(id).await?;

        let state = match request.is_active {
            Some(true) => Some(current.state.activate()?),
            Some(false) => Some(current.state.deactivate()),
            None => None,
        };

        // A changed body invalidates the stored tag set
        let tags = request.template_body.as_deref().map(extract_tags);

        let patch = NotificationTypePatch {
            name: request.name,
            description: request.description,
            template_subject: request.template_subject,
            template_body: request.template_body,
            tags,
            state,
        };

        self.store
            .update_notification_type(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Soft-delete the notification type. Leaf of the cascade chain:
    /// messages already composed from it are immutable and stay untouched.
    pub async fn delete(&self, id: Uuid) -> Result<NotificationType> {
        let deleted = self
            .store
            .mark_notification_type_deleted(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        tracing::info!(notification_type_id = %id, "Notification type deleted");
        Ok(deleted)
    }

    /// Soft-delete several notification types at once. Unknown ids are
    /// skipped; fails only when no id matched anything.
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<Vec<NotificationType>> {
        let mut deleted = Vec::new();
        for &id in ids {
            match self.delete(id).await {
                Ok(notification_type) => deleted.push(notification_type),
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        if deleted.is_empty() {
            return Err(AppError::NotFound("Nothing to delete.".to_string()));
        }

        tracing::info!(deleted = deleted.len(), "Notification types bulk deleted");
        Ok(deleted)
    }
}
