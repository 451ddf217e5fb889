//! Application CRUD and the top-level delete cascade.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    ActivityState, Application, CreateApplicationRequest, UpdateApplicationRequest,
};
use crate::error::{AppError, Result};
use crate::store::{ApplicationPatch, DataStore, EntityFilter, Page, Sort};

use super::ListParams;

const NOT_FOUND: &str = "The application with the given ID was not found.";

pub struct ApplicationService {
    store: Arc<dyn DataStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateApplicationRequest) -> Result<Application> {
        request.validate()?;
        let app = self.store.insert_application(request.into()).await?;

        tracing::info!(application_id = %app.id, name = %app.name, "Application created");
        Ok(app)
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        self.store
            .find_application(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn list(&self, params: ListParams) -> Result<Page<Application>> {
        let (filter, sort, page) = params.parts(None);

        let total = self.store.count_applications(&filter).await?;
        let (current_page, last_page, window) = page.resolve(total);
        let items = self.store.list_applications(&filter, sort, window).await?;

        Ok(Page {
            current_page,
            last_page,
            total,
            items,
        })
    }

    pub async fn update(&self, id: Uuid, request: UpdateApplicationRequest) -> Result<Application> {
        request.validate()?;
        let current = self.get(id).await?;

        let state = match request.is_active {
            Some(true) => Some(current.state.activate()?),
            Some(false) => Some(current.state.deactivate()),
            None => None,
        };

        let patch = ApplicationPatch {
            name: request.name,
            description: request.description,
            state,
        };

        self.store
            .update_application(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Soft-delete the application and cascade deletion to its events and
    /// their notification types.
    ///
    /// The cascade is eager but not transactional: a failure after the
    /// application row is marked leaves children live until the delete is
    /// retried. Deleting an already-deleted application is a no-op that
    /// still re-runs the cascade, so retrying converges.
    pub async fn delete(&self, id: Uuid) -> Result<Application> {
        let deleted = self
            .store
            .mark_application_deleted(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        // Collect event ids before cascading, including already-deleted
        // events so their notification types are still swept on retry.
        let mut all_children = EntityFilter::children_of(id);
        all_children.include_deleted = true;
        let event_ids: Vec<Uuid> = self
            .store
            .list_events(&all_children, Sort::default(), None)
            .await
            .map_err(|e| {
                tracing::error!(
                    application_id = %id,
                    error = %e,
                    "Cascade aborted before touching events; retry delete to converge"
                );
                e
            })?
            .into_iter()
            .map(|e| e.id)
            .collect();

        let events_touched = self
            .store
            .update_events_state(&EntityFilter::children_of(id), ActivityState::Deleted)
            .await
            .map_err(|e| {
                tracing::error!(
                    application_id = %id,
                    error = %e,
                    "Event cascade failed partway; retry delete to converge"
                );
                e
            })?;

        let mut types_touched = 0;
        if !event_ids.is_empty() {
            let type_filter = EntityFilter {
                parent_in: Some(event_ids),
                ..Default::default()
            };
            types_touched = self
                .store
                .update_notification_types_state(&type_filter, ActivityState::Deleted)
                .await
                .map_err(|e| {
                    tracing::error!(
                        application_id = %id,
                        error = %e,
                        "Notification type cascade failed partway; retry delete to converge"
                    );
                    e
                })?;
        }

        tracing::info!(
            application_id = %id,
            events_deleted = events_touched,
            notification_types_deleted = types_touched,
            "Application deleted with cascade"
        );

        Ok(deleted)
    }

    /// Soft-delete several applications at once, cascading each one.
    /// Unknown ids are skipped; fails only when no id matched anything.
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<Vec<Application>> {
        let mut deleted = Vec::new();
        for &id in ids {
            match self.delete(id).await {
                Ok(app) => deleted.push(app),
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        if deleted.is_empty() {
            return Err(AppError::NotFound("Nothing to delete.".to_string()));
        }

        tracing::info!(deleted = deleted.len(), "Applications bulk deleted");
        Ok(deleted)
    }
}
