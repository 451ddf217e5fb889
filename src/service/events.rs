//! Event CRUD: creation requires a live owning application; deletion
//! cascades to the event's notification types.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ActivityState, CreateEventRequest, Event, UpdateEventRequest};
use crate::error::{AppError, Result};
use crate::store::{DataStore, EntityFilter, EventPatch, Page};

use super::ListParams;

const NOT_FOUND: &str = "The event with the given ID was not found.";

pub struct EventService {
    store: Arc<dyn DataStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        let application_id = request.validate()?;

        let application = self
            .store
            .find_application(application_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation("The application with the given ID was not found.".to_string())
            })?;
        if !application.state.is_active() {
            return Err(AppError::Validation(
                "The application with the given ID is inactive.".to_string(),
            ));
        }

        let event = self
            .store
            .insert_event(request.into_event(application_id))
            .await?;

        tracing::info!(event_id = %event.id, application_id = %application_id, name = %event.name, "Event created");
        Ok(event)
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// List events under one application.
    pub async fn list(&self, application: Uuid, params: ListParams) -> Result<Page<Event>> {
        let (filter, sort, page) = params.parts(Some(application));

        let total = self.store.count_events(&filter).await?;
        let (current_page, last_page, window) = page.resolve(total);
        let items = self.store.list_events(&filter, sort, window).await?;

        Ok(Page {
            current_page,
            last_page,
            total,
            items,
        })
    }

    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> Result<Event> {
        request.validate()?;
        let current = self.get(id).await?;

        let state = match request.is_active {
            Some(true) => Some(current.state.activate()?),
            Some(false) => Some(current.state.deactivate()),
            None => None,
        };

        let patch = EventPatch {
            name: request.name,
            description: request.description,
            state,
        };

        self.store
            .update_event(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Soft-delete the event and cascade deletion to its notification
    /// types. Non-transactional; retry-safe because delete is idempotent
    /// and re-runs the cascade even when the event is already deleted.
    pub async fn delete(&self, id: Uuid) -> Result<Event> {
        let deleted = self
            .store
            .mark_event_deleted(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        let types_touched = self
            .store
            .update_notification_types_state(&EntityFilter::children_of(id), ActivityState::Deleted)
            .await
            .map_err(|e| {
                tracing::error!(
                    event_id = %id,
                    error = %e,
                    "Notification type cascade failed partway; retry delete to converge"
                );
                e
            })?;

        tracing::info!(
            event_id = %id,
            notification_types_deleted = types_touched,
            "Event deleted with cascade"
        );

        Ok(deleted)
    }
}
