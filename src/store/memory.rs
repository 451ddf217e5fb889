//! In-memory data store backed by `DashMap`.
//!
//! Used by the "memory" backend setting and throughout the test suite.
//! Semantics mirror the PostgreSQL backend: unique names on applications
//! and events (deleted rows still occupy their name), deleted rows
//! invisible to `find_*`, merge-style updates that bump `modified_at`.

use std::cmp::Ordering;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use async_trait::async_trait;

use crate::domain::{ActivityState, Application, Event, Message, NotificationType};

use super::{
    ApplicationPatch, ApplicationStore, EntityFilter, EventPatch, EventStore, MessageStore,
    NotificationTypePatch, NotificationTypeStore, PageWindow, Sort, SortField, SortOrder,
    StoreError, StoreResult,
};

#[derive(Default)]
pub struct MemoryStore {
    applications: DashMap<Uuid, Application>,
    events: DashMap<Uuid, Event>,
    notification_types: DashMap<Uuid, NotificationType>,
    messages: DashMap<Uuid, Message>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The pieces of an entity the shared filter/sort logic needs.
struct Row<'a> {
    name: &'a str,
    state: ActivityState,
    parent: Option<Uuid>,
    created_at: chrono::DateTime<chrono::Utc>,
    modified_at: chrono::DateTime<chrono::Utc>,
}

impl Row<'_> {
    fn matches(&self, filter: &EntityFilter) -> bool {
        if !filter.include_deleted && self.state.is_deleted() {
            return false;
        }
        if let Some(active) = filter.is_active {
            if self.state.is_active() != active {
                return false;
            }
        }
        if let Some(parent) = filter.parent {
            if self.parent != Some(parent) {
                return false;
            }
        }
        if let Some(parents) = &filter.parent_in {
            match self.parent {
                Some(p) if parents.contains(&p) => {}
                _ => return false,
            }
        }
        if let Some(like) = &filter.name_like {
            if !self
                .name
                .to_lowercase()
                .contains(&like.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

fn compare(a: &Row<'_>, b: &Row<'_>, sort: Sort) -> Ordering {
    let ordering = match sort.field {
        SortField::Name => a.name.cmp(b.name),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::ModifiedAt => a.modified_at.cmp(&b.modified_at),
        SortField::State => a.state.as_str().cmp(b.state.as_str()),
    };
    match sort.order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn apply_window<T>(items: Vec<T>, window: Option<PageWindow>) -> Vec<T> {
    match window {
        Some(w) => items
            .into_iter()
            .skip(w.skip as usize)
            .take(w.limit as usize)
            .collect(),
        None => items,
    }
}

impl MemoryStore {
    fn application_row(app: &Application) -> Row<'_> {
        Row {
            name: &app.name,
            state: app.state,
            parent: None,
            created_at: app.created_at,
            modified_at: app.modified_at,
        }
    }

    fn event_row(event: &Event) -> Row<'_> {
        Row {
            name: &event.name,
            state: event.state,
            parent: Some(event.application),
            created_at: event.created_at,
            modified_at: event.modified_at,
        }
    }

    fn notification_type_row(nt: &NotificationType) -> Row<'_> {
        Row {
            name: &nt.name,
            state: nt.state,
            parent: Some(nt.event),
            created_at: nt.created_at,
            modified_at: nt.modified_at,
        }
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert_application(&self, app: Application) -> StoreResult<Application> {
        if self.applications.iter().any(|e| e.name == app.name) {
            return Err(StoreError::Constraint(format!(
                "application name \"{}\" already exists",
                app.name
            )));
        }
        self.applications.insert(app.id, app.clone());
        Ok(app)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(self
            .applications
            .get(&id)
            .filter(|a| !a.state.is_deleted())
            .map(|a| a.clone()))
    }

    async fn list_applications(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Application>> {
        let mut items: Vec<Application> = self
            .applications
            .iter()
            .filter(|e| Self::application_row(e.value()).matches(filter))
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| compare(&Self::application_row(a), &Self::application_row(b), sort));
        Ok(apply_window(items, window))
    }

    async fn count_applications(&self, filter: &EntityFilter) -> StoreResult<u64> {
        Ok(self
            .applications
            .iter()
            .filter(|e| Self::application_row(e.value()).matches(filter))
            .count() as u64)
    }

    async fn update_application(
        &self,
        id: Uuid,
        patch: ApplicationPatch,
    ) -> StoreResult<Option<Application>> {
        let Some(mut entry) = self.applications.get_mut(&id) else {
            return Ok(None);
        };
        if entry.state.is_deleted() {
            return Ok(None);
        }
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(state) = patch.state {
            entry.state = state;
        }
        entry.modified_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn mark_application_deleted(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let Some(mut entry) = self.applications.get_mut(&id) else {
            return Ok(None);
        };
        if !entry.state.is_deleted() {
            entry.state = entry.state.delete();
            entry.modified_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: Event) -> StoreResult<Event> {
        if self.events.iter().any(|e| e.name == event.name) {
            return Err(StoreError::Constraint(format!(
                "event name \"{}\" already exists",
                event.name
            )));
        }
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(self
            .events
            .get(&id)
            .filter(|e| !e.state.is_deleted())
            .map(|e| e.clone()))
    }

    async fn list_events(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<Event>> {
        let mut items: Vec<Event> = self
            .events
            .iter()
            .filter(|e| Self::event_row(e.value()).matches(filter))
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| compare(&Self::event_row(a), &Self::event_row(b), sort));
        Ok(apply_window(items, window))
    }

    async fn count_events(&self, filter: &EntityFilter) -> StoreResult<u64> {
        Ok(self
            .events
            .iter()
            .filter(|e| Self::event_row(e.value()).matches(filter))
            .count() as u64)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>> {
        let Some(mut entry) = self.events.get_mut(&id) else {
            return Ok(None);
        };
        if entry.state.is_deleted() {
            return Ok(None);
        }
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(state) = patch.state {
            entry.state = state;
        }
        entry.modified_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn mark_event_deleted(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let Some(mut entry) = self.events.get_mut(&id) else {
            return Ok(None);
        };
        if !entry.state.is_deleted() {
            entry.state = entry.state.delete();
            entry.modified_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn update_events_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64> {
        let mut touched = 0;
        for mut entry in self.events.iter_mut() {
            if Self::event_row(entry.value()).matches(filter) {
                entry.state = state;
                entry.modified_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl NotificationTypeStore for MemoryStore {
    async fn insert_notification_type(
        &self,
        notification_type: NotificationType,
    ) -> StoreResult<NotificationType> {
        self.notification_types
            .insert(notification_type.id, notification_type.clone());
        Ok(notification_type)
    }

    async fn find_notification_type(&self, id: Uuid) -> StoreResult<Option<NotificationType>> {
        Ok(self
            .notification_types
            .get(&id)
            .filter(|nt| !nt.state.is_deleted())
            .map(|nt| nt.clone()))
    }

    async fn list_notification_types(
        &self,
        filter: &EntityFilter,
        sort: Sort,
        window: Option<PageWindow>,
    ) -> StoreResult<Vec<NotificationType>> {
        let mut items: Vec<NotificationType> = self
            .notification_types
            .iter()
            .filter(|e| Self::notification_type_row(e.value()).matches(filter))
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| {
            compare(
                &Self::notification_type_row(a),
                &Self::notification_type_row(b),
                sort,
            )
        });
        Ok(apply_window(items, window))
    }

    async fn count_notification_types(&self, filter: &EntityFilter) -> StoreResult<u64> {
        Ok(self
            .notification_types
            .iter()
            .filter(|e| Self::notification_type_row(e.value()).matches(filter))
            .count() as u64)
    }

    async fn update_notification_type(
        &self,
        id: Uuid,
        patch: NotificationTypePatch,
    ) -> StoreResult<Option<NotificationType>> {
        let Some(mut entry) = self.notification_types.get_mut(&id) else {
            return Ok(None);
        };
        if entry.state.is_deleted() {
            return Ok(None);
        }
        if let Some(name) = patch.name {
            entry.name = name;
        }
        if let Some(description) = patch.description {
            entry.description = description;
        }
        if let Some(template_subject) = patch.template_subject {
            entry.template_subject = template_subject;
        }
        if let Some(template_body) = patch.template_body {
            entry.template_body = template_body;
        }
        if let Some(tags) = patch.tags {
            entry.tags = tags;
        }
        if let Some(state) = patch.state {
            entry.state = state;
        }
        entry.modified_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    async fn mark_notification_type_deleted(
        &self,
        id: Uuid,
    ) -> StoreResult<Option<NotificationType>> {
        let Some(mut entry) = self.notification_types.get_mut(&id) else {
            return Ok(None);
        };
        if !entry.state.is_deleted() {
            entry.state = entry.state.delete();
            entry.modified_at = Utc::now();
        }
        Ok(Some(entry.clone()))
    }

    async fn update_notification_types_state(
        &self,
        filter: &EntityFilter,
        state: ActivityState,
    ) -> StoreResult<u64> {
        let mut touched = 0;
        for mut entry in self.notification_types.iter_mut() {
            if Self::notification_type_row(entry.value()).matches(filter) {
                entry.state = state;
                entry.modified_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: Message) -> StoreResult<Message> {
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreateApplicationRequest;

    fn app(name: &str) -> Application {
        CreateApplicationRequest {
            name: name.to_string(),
            description: String::new(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store = MemoryStore::new();
        store.insert_application(app("orders")).await.unwrap();

        let err = store.insert_application(app("orders")).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_find_excludes_deleted() {
        let store = MemoryStore::new();
        let stored = store.insert_application(app("orders")).await.unwrap();

        let patch = ApplicationPatch {
            state: Some(ActivityState::Deleted),
            ..Default::default()
        };
        store.update_application(stored.id, patch).await.unwrap();

        assert!(store.find_application(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_bumps_modified_at() {
        let store = MemoryStore::new();
        let stored = store.insert_application(app("orders")).await.unwrap();

        let updated = store
            .update_application(
                stored.id,
                ApplicationPatch {
                    description: Some("order flow".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, "order flow");
        assert!(updated.modified_at >= stored.modified_at);
        // untouched fields keep their values
        assert_eq!(updated.name, "orders");
    }

    #[tokio::test]
    async fn test_name_filter_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        store.insert_application(app("Order Service")).await.unwrap();
        store.insert_application(app("billing")).await.unwrap();

        let filter = EntityFilter {
            name_like: Some("order".to_string()),
            ..Default::default()
        };
        let found = store
            .list_applications(&filter, Sort::default(), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Order Service");
    }

    #[tokio::test]
    async fn test_sort_descending_by_name() {
        let store = MemoryStore::new();
        for name in ["alpha", "bravo", "charlie"] {
            store.insert_application(app(name)).await.unwrap();
        }

        let sort = Sort {
            field: SortField::Name,
            order: SortOrder::Descending,
        };
        let names: Vec<String> = store
            .list_applications(&EntityFilter::default(), sort, None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["charlie", "bravo", "alpha"]);
    }
}
